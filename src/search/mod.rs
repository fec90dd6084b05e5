//! 検索・置換モジュール
//!
//! ドキュメント表面のマークアップに対してリテラル検索を行い、
//! ハイライトの適用・除去、1件置換、一括置換を提供する。
//!
//! マッチ参照はエンジンが最後に書き込んだ内容に対してのみ有効。
//! 表面の内容がそれ以外の手段で変わった場合は、参照をたどらずに再走査する。

mod highlight;
mod matcher;
mod state;
pub mod types;

use crate::config::{HighlightPalette, SearchConfig, Theme};
use crate::error::{InkpadError, Result, SearchError};
use crate::markup;
use crate::notify::{NotificationSink, Severity};
use crate::surface::DocumentSurface;
use highlight::MarkerStyle;
use std::fmt;
use std::rc::Rc;

pub use matcher::{LiteralMatcher, StringMatcher};
pub use state::SearchSession;
pub use types::{
    MatchLocator, MatchRef, ReplaceAllOutcome, ReplaceOutcome, SearchOutcome, SearchSummary,
};

/// 検索・置換エンジン
///
/// 1ドキュメントにつき1つ作成する。
pub struct FindReplaceEngine<M: StringMatcher = LiteralMatcher> {
    matcher: M,
    session: SearchSession,
    marker_class: String,
    palette: HighlightPalette,
    notifier: Rc<dyn NotificationSink>,
}

impl FindReplaceEngine<LiteralMatcher> {
    /// 既定のリテラルマッチャーで作成
    pub fn new(config: &SearchConfig, theme: Theme, notifier: Rc<dyn NotificationSink>) -> Self {
        Self::with_matcher(LiteralMatcher::new(), config, theme, notifier)
    }
}

impl<M: StringMatcher> FindReplaceEngine<M> {
    /// マッチャーを差し替えて作成
    pub fn with_matcher(
        matcher: M,
        config: &SearchConfig,
        theme: Theme,
        notifier: Rc<dyn NotificationSink>,
    ) -> Self {
        Self {
            matcher,
            session: SearchSession::new(),
            marker_class: config.marker_class.clone(),
            palette: config.palette(theme).clone(),
            notifier,
        }
    }

    /// 検索状態
    pub fn session(&self) -> &SearchSession {
        &self.session
    }

    /// 最後に入力された検索語
    pub fn term(&self) -> &str {
        &self.session.term
    }

    /// 現在のマッチ一覧
    pub fn matches(&self) -> &[MatchRef] {
        &self.session.matches
    }

    /// 現在のマッチ位置
    pub fn cursor(&self) -> Option<usize> {
        self.session.cursor
    }

    /// 現在のマッチ
    pub fn current_match(&self) -> Option<&MatchRef> {
        self.session.current()
    }

    /// ハイライト中のマッチがあるか
    pub fn is_active(&self) -> bool {
        !self.session.matches.is_empty()
    }

    /// ダイアログ表示用の要約
    pub fn summary(&self) -> SearchSummary {
        SearchSummary {
            term: self.session.term.clone(),
            current: self.session.cursor.map(|idx| idx + 1),
            total: self.session.matches.len(),
        }
    }

    /// 検索ダイアログを開く
    ///
    /// 空白以外を含む選択があれば、検索語の初期値として返す。
    pub fn open<S: DocumentSurface + ?Sized>(&self, surface: &S) -> Option<String> {
        surface
            .selection_text()
            .filter(|selection| !selection.trim().is_empty())
    }

    /// 検索ダイアログを閉じる
    pub fn close<S: DocumentSurface + ?Sized>(&mut self, surface: &mut S) {
        self.clear_highlights(surface);
    }

    /// 表面の内容がエンジン外で置き換えられたときに状態を破棄する
    pub fn reset(&mut self) {
        self.session.clear();
    }

    /// 全件を走査してハイライトする
    pub fn find<S: DocumentSurface + ?Sized>(
        &mut self,
        surface: &mut S,
        term: &str,
    ) -> Result<SearchOutcome> {
        self.validate_term(term)?;
        self.session.term = term.to_string();
        let outcome = self.rescan(surface);
        self.announce(outcome);
        Ok(outcome)
    }

    /// 次のマッチへ移動する（末尾から先頭へ循環）
    pub fn find_next<S: DocumentSurface + ?Sized>(
        &mut self,
        surface: &mut S,
    ) -> Result<Option<usize>> {
        self.navigate(surface, SearchSession::advance)
    }

    /// 前のマッチへ移動する（先頭から末尾へ循環）
    pub fn find_previous<S: DocumentSurface + ?Sized>(
        &mut self,
        surface: &mut S,
    ) -> Result<Option<usize>> {
        self.navigate(surface, SearchSession::retreat)
    }

    /// 現在のマッチを置換する
    ///
    /// ハイライト中のマッチがなければ、検索語と一致する選択範囲を置換する。
    pub fn replace_current<S: DocumentSurface + ?Sized>(
        &mut self,
        surface: &mut S,
        term: &str,
        replacement: &str,
    ) -> Result<ReplaceOutcome> {
        self.validate_term(term)?;
        let content = surface.content();
        let same_term = self.session.term.to_lowercase() == term.to_lowercase();

        if same_term && self.session.is_live(&content) {
            if let Some(current) = self.session.current().cloned() {
                let replaced = highlight::splice(
                    &self.session.base,
                    &[current.range],
                    &markup::escape_text(replacement),
                );
                surface.set_content(&replaced);
                self.session.term = term.to_string();
                // 置換後の内容で必ず作り直す
                let remaining = self.rescan(surface).count();
                self.notifier.notify(
                    &format!("1 件置換しました（残り {} 件）", remaining),
                    Severity::Success,
                );
                return Ok(ReplaceOutcome::Replaced);
            }
        }

        self.log_if_stale(&content);
        self.session.term = term.to_string();

        match surface.selection_text() {
            Some(selected) if selected.to_lowercase() == term.to_lowercase() => {
                surface.replace_selection(replacement);
                let remaining = self.rescan(surface).count();
                self.notifier.notify(
                    &format!("1 件置換しました（残り {} 件）", remaining),
                    Severity::Success,
                );
                Ok(ReplaceOutcome::Replaced)
            }
            _ => {
                self.report(&SearchError::NothingToReplace.into());
                Ok(ReplaceOutcome::NothingToReplace)
            }
        }
    }

    /// すべての一致を一括で置換する
    ///
    /// 置換で挿入した文字列は再走査しない。
    pub fn replace_all<S: DocumentSurface + ?Sized>(
        &mut self,
        surface: &mut S,
        term: &str,
        replacement: &str,
    ) -> Result<ReplaceAllOutcome> {
        self.validate_term(term)?;
        self.session.term = term.to_string();

        let content = surface.content();
        let (base, _) = highlight::strip_markers(&content, &self.marker_class);
        let spans = highlight::scan(&base, term, &self.matcher);
        self.session.clear();

        if spans.is_empty() {
            if base != content {
                surface.set_content(&base);
            }
            self.announce(SearchOutcome::NoMatches);
            return Ok(ReplaceAllOutcome::NoMatches);
        }

        let replaced = highlight::splice(&base, &spans, &markup::escape_text(replacement));
        surface.set_content(&replaced);
        log::debug!("replaced {} occurrence(s) of {:?}", spans.len(), term);
        self.notifier.notify(
            &format!("{} 件置換しました", spans.len()),
            Severity::Success,
        );
        Ok(ReplaceAllOutcome::Replaced(spans.len()))
    }

    /// すべてのハイライトを外す
    ///
    /// 戻り値は外したマーカー数。
    pub fn clear_highlights<S: DocumentSurface + ?Sized>(&mut self, surface: &mut S) -> usize {
        let content = surface.content();
        let (base, removed) = highlight::strip_markers(&content, &self.marker_class);
        if removed > 0 {
            surface.set_content(&base);
        }
        self.session.clear();
        removed
    }

    /// ハイライトを除いた表面の内容
    pub fn unmarked_content<S: DocumentSurface + ?Sized>(&self, surface: &S) -> String {
        highlight::strip_markers(&surface.content(), &self.marker_class).0
    }

    /// 参照を解決する
    pub fn resolve<S: DocumentSurface + ?Sized>(
        &self,
        surface: &S,
        locator: MatchLocator,
    ) -> Result<&MatchRef> {
        if self.session.resolves(locator) && self.session.is_live(&surface.content()) {
            return Ok(&self.session.matches[locator.ordinal]);
        }
        Err(SearchError::StaleMatchReference {
            generation: locator.generation,
        }
        .into())
    }

    /// ハイライト配色を変更し、表示中のマーカーに反映する
    pub fn set_palette<S: DocumentSurface + ?Sized>(
        &mut self,
        surface: &mut S,
        palette: HighlightPalette,
    ) {
        self.palette = palette;
        if self.session.is_live(&surface.content()) {
            self.apply(surface);
        }
    }

    fn navigate<S: DocumentSurface + ?Sized>(
        &mut self,
        surface: &mut S,
        step: fn(&mut SearchSession) -> Option<usize>,
    ) -> Result<Option<usize>> {
        let content = surface.content();
        if !self.session.is_live(&content) {
            self.log_if_stale(&content);
            let term = self.session.term.clone();
            self.find(surface, &term)?;
            return Ok(self.session.cursor);
        }

        step(&mut self.session);
        self.apply(surface);
        Ok(self.session.cursor)
    }

    fn rescan<S: DocumentSurface + ?Sized>(&mut self, surface: &mut S) -> SearchOutcome {
        let content = surface.content();
        let (base, removed) = highlight::strip_markers(&content, &self.marker_class);
        let spans = highlight::scan(&base, &self.session.term, &self.matcher);
        self.session.rebuild(base, spans);

        if self.session.matches.is_empty() {
            if removed > 0 {
                surface.set_content(&self.session.base);
            }
            return SearchOutcome::NoMatches;
        }

        self.apply(surface);
        SearchOutcome::Found(self.session.matches.len())
    }

    fn apply<S: DocumentSurface + ?Sized>(&mut self, surface: &mut S) {
        let spans: Vec<_> = self
            .session
            .matches
            .iter()
            .map(|m| m.range.clone())
            .collect();
        let rendered = highlight::render(
            &self.session.base,
            &spans,
            self.session.cursor,
            &self.style(),
        );
        surface.set_content(&rendered);
        self.session.applied = Some(rendered);
        if let Some(current) = self.session.current() {
            surface.scroll_into_view(current.locator);
        }
    }

    fn style(&self) -> MarkerStyle<'_> {
        MarkerStyle {
            class: &self.marker_class,
            current_color: &self.palette.current,
            other_color: &self.palette.other,
        }
    }

    fn validate_term(&self, term: &str) -> Result<()> {
        if term.trim().is_empty() {
            let error: InkpadError = SearchError::EmptySearchTerm.into();
            self.report(&error);
            return Err(error);
        }
        Ok(())
    }

    fn log_if_stale(&self, content: &str) {
        if !self.session.matches.is_empty() && !self.session.is_live(content) {
            let stale = SearchError::StaleMatchReference {
                generation: self.session.generation,
            };
            log::debug!("{}; rescanning", stale);
        }
    }

    fn announce(&self, outcome: SearchOutcome) {
        match outcome {
            SearchOutcome::Found(count) => self.notifier.notify(
                &format!("{} 件見つかりました", count),
                Severity::Success,
            ),
            SearchOutcome::NoMatches => self.notifier.notify(
                &format!("「{}」は見つかりません", self.session.term),
                Severity::Warning,
            ),
        }
    }

    fn report(&self, error: &InkpadError) {
        self.notifier.notify(&error.user_message(), error.severity());
    }
}

impl<M: StringMatcher> fmt::Debug for FindReplaceEngine<M> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FindReplaceEngine")
            .field("session", &self.session)
            .field("marker_class", &self.marker_class)
            .field("palette", &self.palette)
            .finish_non_exhaustive()
    }
}
