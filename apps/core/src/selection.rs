use std::sync::Arc;
use std::time::Duration;

use crate::config::Config;
use crate::emitter::EmitSink;
use crate::grid::GridLayout;
use crate::model::Item;
use crate::ranking::RankedListCache;
use crate::scheduler::Scheduler;
use crate::search::DEFAULT_EXACT_WEIGHT;
use crate::usage_store::UsageStore;

/// Presentation hooks. Every method defaults to doing nothing.
pub trait PickerObserver {
    /// The ranked list or the highlighted position changed.
    fn list_changed(&mut self, _items: &[&Item], _highlighted: usize) {}
    /// A different item is now highlighted.
    fn highlight_changed(&mut self, _item: &Item) {}
    /// A commit finished and the query is about to be cleared.
    fn cleared(&mut self) {}
    /// A commit wants the picker out of the way before the glyph is emitted.
    fn dismiss_requested(&mut self) {}
}

#[derive(Debug, Default, Clone, Copy)]
pub struct NoopObserver;

impl PickerObserver for NoopObserver {}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Left,
    Right,
    Up,
    Down,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ControllerOptions {
    pub emit_delay: Duration,
    pub grid: GridLayout,
    pub exact_weight: i64,
}

impl Default for ControllerOptions {
    fn default() -> Self {
        Self {
            emit_delay: Duration::from_millis(100),
            grid: GridLayout::default(),
            exact_weight: DEFAULT_EXACT_WEIGHT,
        }
    }
}

impl From<&Config> for ControllerOptions {
    fn from(cfg: &Config) -> Self {
        Self {
            emit_delay: Duration::from_millis(cfg.emit_delay_ms),
            grid: GridLayout::with_columns(cfg.grid_columns as usize),
            exact_weight: cfg.exact_weight,
        }
    }
}

/// Owns the query, the highlighted position and the usage store, and keeps
/// them consistent with the ranked list.
pub struct SelectionController {
    library: Vec<Item>,
    usages: UsageStore,
    cache: RankedListCache,
    query: String,
    highlighted_index: usize,
    last_notified_id: Option<String>,
    options: ControllerOptions,
    observer: Box<dyn PickerObserver>,
    sink: Arc<dyn EmitSink>,
    scheduler: Box<dyn Scheduler>,
}

impl SelectionController {
    pub fn new(
        library: Vec<Item>,
        usages: UsageStore,
        sink: Arc<dyn EmitSink>,
        scheduler: Box<dyn Scheduler>,
    ) -> Self {
        Self {
            library,
            usages,
            cache: RankedListCache::new(),
            query: String::new(),
            highlighted_index: 0,
            last_notified_id: None,
            options: ControllerOptions::default(),
            observer: Box::new(NoopObserver),
            sink,
            scheduler,
        }
    }

    pub fn with_options(mut self, options: ControllerOptions) -> Self {
        self.options = options;
        self.cache.invalidate();
        self
    }

    pub fn with_observer(mut self, observer: Box<dyn PickerObserver>) -> Self {
        self.observer = observer;
        self
    }

    pub fn query(&self) -> &str {
        &self.query
    }

    pub fn highlighted_index(&self) -> usize {
        self.highlighted_index
    }

    pub fn last_notified_id(&self) -> Option<&str> {
        self.last_notified_id.as_deref()
    }

    pub fn library(&self) -> &[Item] {
        &self.library
    }

    pub fn usages(&self) -> &UsageStore {
        &self.usages
    }

    pub fn options(&self) -> &ControllerOptions {
        &self.options
    }

    pub fn ranked_items(&mut self) -> Vec<&Item> {
        let indices = self.cache.get_or_compute(
            &self.library,
            &self.query,
            &self.usages,
            self.options.exact_weight,
        );
        indices.iter().map(|index| &self.library[*index]).collect()
    }

    pub fn highlighted_item(&mut self) -> Option<&Item> {
        let library_index = self.library_index_at(self.highlighted_index)?;
        self.library.get(library_index)
    }

    pub fn set_query(&mut self, query: &str) {
        self.query = query.to_string();
        self.highlighted_index = 0;
        self.notify_list();
        if let Some(library_index) = self.library_index_at(0) {
            self.notify_highlight(library_index);
        }
    }

    /// Moves the highlight to `proposed`, wrapped into the list bounds. Returns
    /// whether the highlighted position changed.
    pub fn navigate(&mut self, proposed: isize) -> bool {
        let len = self.ranked_len();
        if len == 0 {
            return false;
        }

        let wrapped = wrap_index(proposed, len);
        if wrapped == self.highlighted_index {
            return false;
        }

        self.highlighted_index = wrapped;
        self.notify_list();
        if let Some(library_index) = self.library_index_at(wrapped) {
            self.notify_highlight(library_index);
        }
        true
    }

    pub fn move_selection(&mut self, direction: Direction) -> bool {
        let columns = self.options.grid.columns.max(1) as isize;
        let step = match direction {
            Direction::Left => -1,
            Direction::Right => 1,
            Direction::Up => -columns,
            Direction::Down => columns,
        };
        self.navigate(self.highlighted_index as isize + step)
    }

    /// Pointer hover over the grid. Points outside every cell are ignored.
    pub fn highlight_at_point(&mut self, x: f64, y: f64) -> bool {
        match self.options.grid.index_at(x, y) {
            Some(index) => self.navigate(index as isize),
            None => false,
        }
    }

    /// Records a use of the highlighted item, clears the query and schedules
    /// the glyph for emission. Returns the committed item.
    ///
    /// The emission is handed to the scheduler only after every state change
    /// and notification of this commit has happened.
    pub fn commit(&mut self) -> Option<Item> {
        let library_index = self.library_index_at(self.highlighted_index)?;
        let item = self.library[library_index].clone();

        self.observer.dismiss_requested();
        self.usages.record_use(&item.id);
        log::info!("committed id={}", item.id);

        self.observer.cleared();
        self.set_query("");

        let sink = Arc::clone(&self.sink);
        let glyph = item.glyph.clone();
        self.scheduler
            .schedule(self.options.emit_delay, Box::new(move || sink.emit(&glyph)));
        Some(item)
    }

    /// Forgets the usage record of the highlighted item. Returns the id only
    /// when a record existed.
    pub fn delete(&mut self) -> Option<String> {
        let library_index = self.library_index_at(self.highlighted_index)?;
        let id = self.library[library_index].id.clone();
        if !self.usages.remove(&id) {
            return None;
        }
        log::info!("forgot usage id={id}");

        self.revalidate_highlight();
        self.notify_list();
        if let Some(library_index) = self.library_index_at(self.highlighted_index) {
            self.notify_highlight(library_index);
        }
        Some(id)
    }

    fn ranked_len(&mut self) -> usize {
        self.cache
            .get_or_compute(
                &self.library,
                &self.query,
                &self.usages,
                self.options.exact_weight,
            )
            .len()
    }

    fn library_index_at(&mut self, position: usize) -> Option<usize> {
        self.cache
            .get_or_compute(
                &self.library,
                &self.query,
                &self.usages,
                self.options.exact_weight,
            )
            .get(position)
            .copied()
    }

    fn revalidate_highlight(&mut self) {
        let len = self.ranked_len();
        if len == 0 {
            self.highlighted_index = 0;
        } else if self.highlighted_index >= len {
            self.highlighted_index = wrap_index(self.highlighted_index as isize, len);
        }
    }

    fn notify_list(&mut self) {
        let indices = self.cache.get_or_compute(
            &self.library,
            &self.query,
            &self.usages,
            self.options.exact_weight,
        );
        let items: Vec<&Item> = indices.iter().map(|index| &self.library[*index]).collect();
        self.observer.list_changed(&items, self.highlighted_index);
    }

    fn notify_highlight(&mut self, library_index: usize) {
        let Some(item) = self.library.get(library_index) else {
            return;
        };
        if self.last_notified_id.as_deref() == Some(item.id.as_str()) {
            return;
        }
        self.last_notified_id = Some(item.id.clone());
        self.observer.highlight_changed(item);
    }
}

pub fn wrap_index(proposed: isize, len: usize) -> usize {
    if len == 0 {
        return 0;
    }
    proposed.rem_euclid(len as isize) as usize
}
