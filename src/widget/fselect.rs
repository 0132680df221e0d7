//! FileSelector - browse directories and pick a file.

use std::cell::RefCell;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::rc::Rc;

use super::list::ListCursor;
use super::{Common, Native, Widget, WidgetBase, resolve_dimension};
use crate::error::Result;
use crate::key::Key;
use crate::renderer::FrameBuffer;
use crate::screen::Screen;
use crate::text::truncate_to_width;
use crate::types::{Attr, ExitType, ObjectType, Rect, Size};

#[derive(Debug, Clone, PartialEq, Eq)]
enum EntryKind {
    Parent,
    Directory,
    File,
}

#[derive(Debug, Clone)]
struct DirEntry {
    name: String,
    kind: EntryKind,
}

impl DirEntry {
    fn label(&self) -> String {
        match self.kind {
            EntryKind::Parent => "..".to_string(),
            EntryKind::Directory => format!("{}/", self.name),
            EntryKind::File => self.name.clone(),
        }
    }
}

/// List `dir`: `..` first when there is a parent, then directories, then
/// files, each group sorted by name.
fn read_listing(dir: &Path, show_hidden: bool) -> io::Result<Vec<DirEntry>> {
    let mut dirs = Vec::new();
    let mut files = Vec::new();
    for entry in fs::read_dir(dir)? {
        let entry = entry?;
        let name = entry.file_name().to_string_lossy().into_owned();
        if !show_hidden && name.starts_with('.') {
            continue;
        }
        // Follows symlinks, so a link to a directory can be entered.
        let is_dir = entry.path().is_dir();
        if is_dir {
            dirs.push(name);
        } else {
            files.push(name);
        }
    }
    dirs.sort();
    files.sort();

    let mut listing = Vec::with_capacity(dirs.len() + files.len() + 1);
    if dir.parent().is_some() {
        listing.push(DirEntry {
            name: "..".to_string(),
            kind: EntryKind::Parent,
        });
    }
    listing.extend(dirs.into_iter().map(|name| DirEntry {
        name,
        kind: EntryKind::Directory,
    }));
    listing.extend(files.into_iter().map(|name| DirEntry {
        name,
        kind: EntryKind::File,
    }));
    Ok(listing)
}

struct FileSelectorState {
    common: Common,
    dir: PathBuf,
    show_hidden: bool,
    entries: Vec<DirEntry>,
    cursor: ListCursor,
    highlight: Attr,
    chosen: Option<PathBuf>,
}

impl FileSelectorState {
    fn view(&self) -> usize {
        // One body row shows the directory.
        (self.common.body().height - 1).max(1) as usize
    }

    fn change_dir(&mut self, dir: PathBuf) {
        match read_listing(&dir, self.show_hidden) {
            Ok(entries) => {
                tracing::debug!(dir = %dir.display(), entries = entries.len(), "directory listed");
                self.cursor.reset(entries.len());
                self.entries = entries;
                self.dir = dir;
            }
            Err(err) => {
                tracing::warn!(dir = %dir.display(), %err, "cannot list directory");
            }
        }
    }

    fn go_up(&mut self) {
        if let Some(parent) = self.dir.parent() {
            let parent = parent.to_path_buf();
            self.change_dir(parent);
        }
    }
}

impl Native for FileSelectorState {
    fn common(&self) -> &Common {
        &self.common
    }

    fn common_mut(&mut self) -> &mut Common {
        &mut self.common
    }

    fn draw_body(&self, buf: &mut FrameBuffer, area: Rect) {
        let dir = self.dir.display().to_string();
        buf.draw_text(area.x, area.y, truncate_to_width(&dir, area.width), Attr::UNDERLINE);

        let view = (area.height - 1).max(0) as usize;
        for (row, index) in self.cursor.visible(view) {
            let label = self.entries[index].label();
            let attrs = if index == self.cursor.current { self.highlight } else { Attr::NONE };
            buf.draw_text(
                area.x,
                area.y + 1 + row as i32,
                truncate_to_width(&label, area.width),
                attrs,
            );
        }
    }

    fn inject(&mut self, key: Key) -> Option<ExitType> {
        let view = self.view();
        if self.cursor.navigate(key, view) {
            return None;
        }
        match key {
            Key::Enter => {
                let entry = self.entries.get(self.cursor.current)?.clone();
                match entry.kind {
                    EntryKind::Parent => self.go_up(),
                    EntryKind::Directory => {
                        let dir = self.dir.join(&entry.name);
                        self.change_dir(dir);
                    }
                    EntryKind::File => {
                        self.chosen = Some(self.dir.join(&entry.name));
                        return Some(ExitType::Normal);
                    }
                }
            }
            Key::Backspace => self.go_up(),
            Key::Escape => return Some(ExitType::EscapeHit),
            _ => {}
        }
        None
    }

    fn clean(&mut self) {
        self.chosen = None;
    }
}

/// A directory browser that completes when a file is chosen.
pub struct FileSelector {
    base: WidgetBase,
    state: Rc<RefCell<FileSelectorState>>,
}

impl FileSelector {
    /// Create a file selector listing `dir`.
    ///
    /// Dot-files are listed when the context configuration asks for them.
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        screen: &Screen,
        x: i32,
        y: i32,
        height: i32,
        width: i32,
        title: &str,
        dir: &Path,
    ) -> Result<Self> {
        let show_hidden = screen.context().config().show_hidden;
        let dir = dir.canonicalize()?;
        let entries = read_listing(&dir, show_hidden)?;

        let mut common = Common::new(screen, x, y, title, true);
        common.fit_outer(Size::new(
            resolve_dimension(screen.width() - x, width),
            resolve_dimension(screen.height() - y, height),
        ));

        let state = Rc::new(RefCell::new(FileSelectorState {
            common,
            dir,
            show_hidden,
            cursor: ListCursor::new(entries.len()),
            entries,
            highlight: Attr::INVERSE,
            chosen: None,
        }));
        let base = WidgetBase::new(screen, ObjectType::FileSelector, state.clone())?;
        Ok(Self { base, state })
    }

    /// The chosen file, once the selector completed normally.
    pub fn value(&self) -> Option<PathBuf> {
        self.state.borrow().chosen.clone()
    }

    /// The directory currently listed.
    pub fn directory(&self) -> PathBuf {
        self.state.borrow().dir.clone()
    }

    /// Entries as shown, directories with a trailing `/`.
    pub fn entries(&self) -> Vec<String> {
        self.state.borrow().entries.iter().map(DirEntry::label).collect()
    }

    /// List `dir` instead and redraw.
    pub fn set_directory(&self, dir: &Path) -> Result<()> {
        let dir = dir.canonicalize()?;
        {
            let mut state = self.state.borrow_mut();
            let entries = read_listing(&dir, state.show_hidden)?;
            state.cursor.reset(entries.len());
            state.entries = entries;
            state.dir = dir;
        }
        self.base.redraw()
    }
}

impl Widget for FileSelector {
    fn base(&self) -> &WidgetBase {
        &self.base
    }
}
