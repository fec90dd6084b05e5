//! 複数ページの管理
//!
//! ページごとに編集領域と検索エンジンを持ち、1ページだけがアクティブになる。

use crate::autosave::AutosaveRecord;
use crate::config::{EditorConfig, Theme};
use crate::error::{InkpadError, PageError, Result};
use crate::keymap::{EditorCommand, HostCommand};
use crate::media::{self, MediaKind};
use crate::notify::{NotificationSink, Severity};
use crate::search::{FindReplaceEngine, ReplaceAllOutcome, ReplaceOutcome, SearchOutcome};
use crate::stats::DocumentStats;
use crate::surface::{DocumentSurface, MemorySurface};
use crate::transfer;
use chrono::{DateTime, NaiveDateTime, Utc};
use std::fmt;
use std::path::{Path, PathBuf};
use std::rc::Rc;

/// 新規ページの初期内容
pub const NEW_PAGE_CONTENT: &str = "<p>ここに入力を始めてください...</p>";

/// ページ識別子
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PageId(u32);

impl PageId {
    pub fn number(self) -> u32 {
        self.0
    }

    /// "page3" 形式を解釈する
    pub fn parse(raw: &str) -> Option<Self> {
        raw.strip_prefix("page")?.parse().ok().map(PageId)
    }
}

impl fmt::Display for PageId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "page{}", self.0)
    }
}

/// 1ページ
#[derive(Debug)]
pub struct Page {
    id: PageId,
    title: String,
    surface: MemorySurface,
    engine: FindReplaceEngine,
}

impl Page {
    pub fn id(&self) -> PageId {
        self.id
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn surface(&self) -> &MemorySurface {
        &self.surface
    }

    /// 編集領域への直接アクセス（ユーザーの入力に相当）
    pub fn surface_mut(&mut self) -> &mut MemorySurface {
        &mut self.surface
    }

    pub fn engine(&self) -> &FindReplaceEngine {
        &self.engine
    }

    pub fn find(&mut self, term: &str) -> Result<SearchOutcome> {
        self.engine.find(&mut self.surface, term)
    }

    pub fn find_next(&mut self) -> Result<Option<usize>> {
        self.engine.find_next(&mut self.surface)
    }

    pub fn find_previous(&mut self) -> Result<Option<usize>> {
        self.engine.find_previous(&mut self.surface)
    }

    pub fn replace_current(&mut self, term: &str, replacement: &str) -> Result<ReplaceOutcome> {
        self.engine
            .replace_current(&mut self.surface, term, replacement)
    }

    pub fn replace_all(&mut self, term: &str, replacement: &str) -> Result<ReplaceAllOutcome> {
        self.engine.replace_all(&mut self.surface, term, replacement)
    }

    pub fn close_search(&mut self) {
        self.engine.close(&mut self.surface);
    }

    /// 内容を丸ごと差し替える。検索状態は破棄する
    pub fn load_content(&mut self, markup: &str) {
        self.engine.reset();
        self.surface.set_content(markup);
    }

    /// ハイライトを除いた内容
    pub fn clean_content(&self) -> String {
        self.engine.unmarked_content(&self.surface)
    }

    pub fn stats(&self) -> DocumentStats {
        DocumentStats::from_markup(&self.clean_content())
    }
}

/// 検索ダイアログの入力状態
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SearchDialog {
    pub open: bool,
    pub term: String,
    pub replacement: String,
}

/// コマンド実行の結果
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CommandEffect {
    Handled,
    /// 書き出したテキストと既定のファイル名
    Exported { text: String, file_name: String },
    /// ホストの編集領域に委ねる
    Host(HostCommand),
}

/// ページの集合
pub struct Workbook {
    pages: Vec<Page>,
    active: usize,
    next_number: u32,
    config: EditorConfig,
    /// テーマ変更を書き戻す設定ファイル
    config_path: Option<PathBuf>,
    theme: Theme,
    dialog: SearchDialog,
    notifier: Rc<dyn NotificationSink>,
}

impl Workbook {
    /// 1ページだけを持つワークブックを作成
    pub fn new(config: EditorConfig, notifier: Rc<dyn NotificationSink>) -> Self {
        let theme = config.theme;
        let mut workbook = Self {
            pages: Vec::new(),
            active: 0,
            next_number: 1,
            config,
            config_path: None,
            theme,
            dialog: SearchDialog::default(),
            notifier,
        };
        workbook.push_page();
        workbook
    }

    /// テーマの変更を指定の設定ファイルへ保存する
    pub fn with_config_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.config_path = Some(path.into());
        self
    }

    pub fn config(&self) -> &EditorConfig {
        &self.config
    }

    pub fn pages(&self) -> &[Page] {
        &self.pages
    }

    pub fn page(&self, id: PageId) -> Option<&Page> {
        self.pages.iter().find(|page| page.id == id)
    }

    pub fn active_page(&self) -> &Page {
        &self.pages[self.active]
    }

    pub fn active_page_mut(&mut self) -> &mut Page {
        &mut self.pages[self.active]
    }

    pub fn theme(&self) -> Theme {
        self.theme
    }

    pub fn dialog(&self) -> &SearchDialog {
        &self.dialog
    }

    pub fn dialog_mut(&mut self) -> &mut SearchDialog {
        &mut self.dialog
    }

    fn push_page(&mut self) -> PageId {
        let id = PageId(self.next_number);
        self.next_number += 1;
        let engine = FindReplaceEngine::new(&self.config.search, self.theme, self.notifier.clone());
        self.pages.push(Page {
            id,
            title: format!("Document {}", id.number()),
            surface: MemorySurface::new(NEW_PAGE_CONTENT),
            engine,
        });
        id
    }

    fn index_of(&self, id: PageId) -> Result<usize> {
        self.pages
            .iter()
            .position(|page| page.id == id)
            .ok_or_else(|| PageError::NotFound { id: id.to_string() }.into())
    }

    fn fail<T>(&self, error: InkpadError) -> Result<T> {
        self.notifier.notify(&error.user_message(), error.severity());
        Err(error)
    }

    /// ページを追加してアクティブにする
    pub fn add_page(&mut self) -> PageId {
        let id = self.push_page();
        self.activate(self.pages.len() - 1);
        log::debug!("added {}", id);
        id
    }

    /// ページを削除する。最後の1ページは削除できない
    pub fn delete_page(&mut self, id: PageId) -> Result<()> {
        if self.pages.len() <= 1 {
            return self.fail(PageError::LastPage.into());
        }
        let index = match self.index_of(id) {
            Ok(index) => index,
            Err(error) => return self.fail(error),
        };

        let was_active = index == self.active;
        self.pages.remove(index);
        if was_active {
            self.active = self.pages.len() - 1;
        } else if index < self.active {
            self.active -= 1;
        }
        log::debug!("deleted {}", id);
        Ok(())
    }

    /// アクティブページを切り替える
    pub fn switch_page(&mut self, id: PageId) -> Result<()> {
        match self.index_of(id) {
            Ok(index) => {
                self.activate(index);
                Ok(())
            }
            Err(error) => self.fail(error),
        }
    }

    fn activate(&mut self, index: usize) {
        if index != self.active {
            self.pages[self.active].close_search();
        }
        self.active = index;
    }

    /// テーマを切り替え、すべてのページのハイライトに反映する
    pub fn toggle_theme(&mut self) -> Theme {
        self.theme = self.theme.toggled();
        let palette = self.config.search.palette(self.theme).clone();
        for page in &mut self.pages {
            page.engine.set_palette(&mut page.surface, palette.clone());
        }
        self.config.theme = self.theme;
        self.notifier.notify(
            &format!("{}テーマを有効にしました", self.theme.label()),
            Severity::Success,
        );
        self.persist_theme();
        self.theme
    }

    fn persist_theme(&self) {
        let Some(path) = &self.config_path else {
            return;
        };
        if let Err(error) = self.config.save(path) {
            log::warn!("failed to persist theme to {}: {}", path.display(), error);
            self.notifier.notify(&error.user_message(), Severity::Warning);
        }
    }

    /// 検索ダイアログを開く。選択中のテキストがあれば検索語に入れる
    pub fn open_search(&mut self) {
        self.dialog.open = true;
        let page = &self.pages[self.active];
        if let Some(prefill) = page.engine.open(&page.surface) {
            self.dialog.term = prefill;
        }
    }

    /// 検索ダイアログを閉じ、ハイライトを外す
    pub fn close_search(&mut self) {
        self.dialog.open = false;
        self.active_page_mut().close_search();
    }

    /// ダイアログの検索語で検索
    pub fn find(&mut self) -> Result<SearchOutcome> {
        let term = self.dialog.term.clone();
        self.active_page_mut().find(&term)
    }

    /// ダイアログの検索語・置換語で1件置換
    pub fn replace(&mut self) -> Result<ReplaceOutcome> {
        let SearchDialog {
            term, replacement, ..
        } = self.dialog.clone();
        self.active_page_mut().replace_current(&term, &replacement)
    }

    /// ダイアログの検索語・置換語で一括置換
    pub fn replace_all(&mut self) -> Result<ReplaceAllOutcome> {
        let SearchDialog {
            term, replacement, ..
        } = self.dialog.clone();
        self.active_page_mut().replace_all(&term, &replacement)
    }

    fn navigate(&mut self, forward: bool) -> Result<Option<usize>> {
        let term = self.dialog.term.clone();
        let page = self.active_page_mut();
        // 検索語が変わっていれば新しい語で検索し直す
        if !term.trim().is_empty() && page.engine.term() != term {
            page.find(&term)?;
            return Ok(page.engine.cursor());
        }
        if forward {
            page.find_next()
        } else {
            page.find_previous()
        }
    }

    /// テキストをアクティブページに取り込む
    pub fn import_text(&mut self, text: &str) -> Result<()> {
        let markup = match transfer::import_text(text, self.config.transfer.max_import_bytes) {
            Ok(markup) => markup,
            Err(error) => return self.fail(error),
        };
        self.active_page_mut().load_content(&markup);
        self.notifier
            .notify("ファイルを読み込みました", Severity::Success);
        Ok(())
    }

    /// アクティブページをテキストとして書き出す
    pub fn export_text(&self) -> Result<String> {
        match transfer::export_text(&self.active_page().clean_content()) {
            Ok(text) => {
                self.notifier
                    .notify("テキストとして保存しました", Severity::Success);
                Ok(text)
            }
            Err(error) => self.fail(error),
        }
    }

    /// 空の表を選択位置に挿入する
    pub fn insert_table(&mut self, rows: Option<usize>, cols: Option<usize>) -> Result<()> {
        let table = match media::table_markup(rows, cols) {
            Ok(table) => table,
            Err(error) => return self.fail(error),
        };
        self.active_page_mut().surface.insert_markup(&table);
        self.notifier.notify("表を挿入しました", Severity::Success);
        Ok(())
    }

    /// 選択中のテキストをリンクにする。選択がなければ URL を表示テキストにする
    pub fn insert_link(&mut self, url: &str) -> Result<()> {
        let text = self
            .active_page()
            .surface
            .selection_text()
            .filter(|text| !text.is_empty())
            .unwrap_or_else(|| url.trim().to_string());
        let link = match media::link_markup(url, &text) {
            Ok(link) => link,
            Err(error) => return self.fail(error),
        };
        self.active_page_mut().surface.insert_markup(&link);
        self.notifier
            .notify("リンクを挿入しました", Severity::Success);
        Ok(())
    }

    /// メディアファイルを埋め込み、アクティブページの末尾に追加する
    pub fn insert_media(&mut self, kind: MediaKind, path: &Path) -> Result<()> {
        let element = match media::load_media(kind, path) {
            Ok(element) => element,
            Err(error) => return self.fail(error),
        };
        self.active_page_mut().surface.append_markup(&element);
        self.notifier
            .notify(&format!("{}を挿入しました", kind.label()), Severity::Success);
        Ok(())
    }

    /// アクティブページを印刷用 HTML にする
    pub fn print_document(&self, exported_at: NaiveDateTime) -> Result<String> {
        let page = self.active_page();
        let words = page.stats().words;
        match transfer::print_document(&page.clean_content(), words, exported_at) {
            Ok(html) => {
                self.notifier.notify(
                    "印刷ダイアログで「PDF に保存」を選んでください",
                    Severity::Info,
                );
                Ok(html)
            }
            Err(error) => self.fail(error),
        }
    }

    /// アクティブページの統計
    pub fn stats(&self) -> DocumentStats {
        self.active_page().stats()
    }

    /// 自動保存用のレコードを作成
    pub fn autosave_record(&self, now: DateTime<Utc>) -> AutosaveRecord {
        let page = self.active_page();
        AutosaveRecord {
            content: page.clean_content(),
            timestamp: now,
            page_id: page.id.to_string(),
        }
    }

    /// 自動保存の内容をアクティブページへ復元する
    pub fn restore(&mut self, record: &AutosaveRecord) {
        self.active_page_mut().load_content(&record.content);
        self.notifier
            .notify("自動保存の内容を読み込みました", Severity::Success);
    }

    /// ショートカットのコマンドを実行する
    pub fn execute(&mut self, command: EditorCommand) -> Result<CommandEffect> {
        match command {
            EditorCommand::OpenSearch => self.open_search(),
            EditorCommand::FindNext => {
                self.navigate(true)?;
            }
            EditorCommand::FindPrevious => {
                self.navigate(false)?;
            }
            EditorCommand::CloseSearch => self.close_search(),
            EditorCommand::NewPage => {
                self.add_page();
            }
            EditorCommand::ExportText => {
                let text = self.export_text()?;
                let file_name = transfer::default_export_name(Utc::now().date_naive());
                return Ok(CommandEffect::Exported { text, file_name });
            }
            EditorCommand::ToggleTheme => {
                self.toggle_theme();
            }
            EditorCommand::Host(host) => return Ok(CommandEffect::Host(host)),
        }
        Ok(CommandEffect::Handled)
    }
}

impl fmt::Debug for Workbook {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Workbook")
            .field("pages", &self.pages)
            .field("active", &self.active)
            .field("theme", &self.theme)
            .field("dialog", &self.dialog)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::notify::RecordingNotifier;

    fn workbook() -> (Workbook, RecordingNotifier) {
        let notifier = RecordingNotifier::new();
        let workbook = Workbook::new(EditorConfig::default(), Rc::new(notifier.clone()));
        (workbook, notifier)
    }

    #[test]
    fn starts_with_one_page() {
        let (workbook, _) = workbook();
        assert_eq!(workbook.pages().len(), 1);
        assert_eq!(workbook.active_page().title(), "Document 1");
        assert_eq!(workbook.active_page().id().to_string(), "page1");
    }

    #[test]
    fn page_numbers_are_not_reused() {
        let (mut workbook, _) = workbook();
        let second = workbook.add_page();
        workbook.delete_page(second).unwrap();
        let third = workbook.add_page();
        assert_eq!(third.number(), 3);
        assert_eq!(workbook.active_page().id(), third);
    }

    #[test]
    fn last_page_cannot_be_deleted() {
        let (mut workbook, notifier) = workbook();
        let only = workbook.active_page().id();
        assert_eq!(
            workbook.delete_page(only),
            Err(InkpadError::Page(PageError::LastPage))
        );
        assert_eq!(notifier.last().unwrap().severity, Severity::Error);
    }

    #[test]
    fn deleting_active_page_activates_last_page() {
        let (mut workbook, _) = workbook();
        let first = workbook.active_page().id();
        let second = workbook.add_page();
        let third = workbook.add_page();
        workbook.switch_page(second).unwrap();

        workbook.delete_page(second).unwrap();
        assert_eq!(workbook.active_page().id(), third);

        workbook.switch_page(third).unwrap();
        workbook.delete_page(first).unwrap();
        assert_eq!(workbook.active_page().id(), third);
    }

    #[test]
    fn switching_pages_clears_highlights() {
        let (mut workbook, _) = workbook();
        workbook.active_page_mut().load_content("<p>cat</p>");
        workbook.active_page_mut().find("cat").unwrap();
        let first = workbook.active_page().id();

        workbook.add_page();
        let page = workbook.page(first).unwrap();
        assert_eq!(page.surface().as_str(), "<p>cat</p>");
        assert!(!page.engine().is_active());
    }

    #[test]
    fn oversized_table_is_a_warning_and_inserts_nothing() {
        let (mut workbook, notifier) = workbook();
        let before = workbook.active_page().surface().as_str().to_string();
        assert!(workbook.insert_table(Some(21), None).is_err());
        assert_eq!(workbook.active_page().surface().as_str(), before);
        assert_eq!(notifier.last().unwrap().severity, Severity::Warning);
    }

    #[test]
    fn link_wraps_selection() {
        let (mut workbook, notifier) = workbook();
        workbook.active_page_mut().load_content("<p>read the docs</p>");
        workbook.active_page_mut().surface_mut().select_first("docs");

        workbook.insert_link("https://example.com/docs").unwrap();
        assert_eq!(
            workbook.active_page().surface().as_str(),
            "<p>read the <a href=\"https://example.com/docs\">docs</a></p>"
        );
        assert_eq!(notifier.last().unwrap().severity, Severity::Success);
    }

    #[test]
    fn invalid_link_leaves_content() {
        let (mut workbook, notifier) = workbook();
        workbook.active_page_mut().load_content("<p>x</p>");
        assert!(workbook.insert_link("not a url").is_err());
        assert_eq!(workbook.active_page().surface().as_str(), "<p>x</p>");
        assert_eq!(notifier.last().unwrap().severity, Severity::Error);
    }

    #[test]
    fn parses_page_ids() {
        assert_eq!(PageId::parse("page12").map(PageId::number), Some(12));
        assert_eq!(PageId::parse("tab1"), None);
    }
}
