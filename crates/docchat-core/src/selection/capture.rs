//! Turns text selections on the host page into candidate queries.

use super::geometry::{Point, Rect, SelectionConfig, SelectionMenuPosition, Viewport};
use std::time::Duration;

/// Read-only view of the host page's current selection.
#[derive(Debug, Clone, PartialEq)]
pub struct PageSelection {
    /// Selected text as reported by the page.
    pub text: String,
    /// Bounding rectangles of the selection ranges, in range order.
    pub ranges: Vec<Rect>,
}

/// The host page, as seen by [`SelectionCapture`].
pub trait SelectionSource: Send + Sync {
    /// Returns the current selection, `None` when nothing is selected.
    fn current_selection(&self) -> Option<PageSelection>;

    /// Removes the native selection highlight.
    fn clear_selection(&self);
}

/// Pointer and touch events forwarded by the host page.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PointerEvent {
    PointerDown(Point),
    TouchStart(Point),
    PointerUp,
    TouchEnd,
}

#[derive(Debug, Clone, PartialEq)]
struct OpenMenu {
    position: SelectionMenuPosition,
    text: String,
}

/// Owns the contextual menu state for one page.
///
/// Lifecycle: a pointer-up/touch-end with a non-empty selection opens the
/// menu; a pointer-down/touch-start outside the menu closes it; invoking the
/// action closes it, clears the native selection and yields the text.
/// What happens to the text afterwards is the controller's business.
pub struct SelectionCapture<S: SelectionSource> {
    source: S,
    config: SelectionConfig,
    menu: Option<OpenMenu>,
}

impl<S: SelectionSource> SelectionCapture<S> {
    pub fn new(source: S, config: SelectionConfig) -> Self {
        Self {
            source,
            config,
            menu: None,
        }
    }

    pub fn config(&self) -> &SelectionConfig {
        &self.config
    }

    /// Current menu anchor, `None` while the menu is closed.
    pub fn menu_position(&self) -> Option<SelectionMenuPosition> {
        self.menu.as_ref().map(|menu| menu.position)
    }

    pub fn is_open(&self) -> bool {
        self.menu.is_some()
    }

    /// Text the menu would emit if invoked now.
    pub fn pending_text(&self) -> Option<&str> {
        self.menu.as_ref().map(|menu| menu.text.as_str())
    }

    /// Feeds one host event and returns the resulting menu anchor.
    ///
    /// Pointer-end events wait `settle_delay_ms` first so the page can
    /// finalize the selection range.
    pub async fn handle_event(
        &mut self,
        event: PointerEvent,
        viewport: Viewport,
    ) -> Option<SelectionMenuPosition> {
        match event {
            PointerEvent::PointerUp | PointerEvent::TouchEnd => {
                if self.config.settle_delay_ms > 0 {
                    tokio::time::sleep(Duration::from_millis(self.config.settle_delay_ms)).await;
                }
                self.refresh(viewport)
            }
            PointerEvent::PointerDown(point) | PointerEvent::TouchStart(point) => {
                self.dismiss_if_outside(point);
                self.menu_position()
            }
        }
    }

    /// Reads the page selection and recomputes the menu.
    ///
    /// Empty, whitespace-only and zero-width selections close the menu.
    /// Only the first range of a multi-range selection is used for placement.
    pub fn refresh(&mut self, viewport: Viewport) -> Option<SelectionMenuPosition> {
        let Some(selection) = self.source.current_selection() else {
            self.menu = None;
            return None;
        };

        let text = selection.text.trim();
        let first_range = selection.ranges.first().filter(|rect| rect.width > 0.0);
        let Some(rect) = first_range.filter(|_| !text.is_empty()) else {
            tracing::debug!("[SelectionCapture] Ignoring empty selection");
            self.menu = None;
            return None;
        };

        if selection.ranges.len() > 1 {
            tracing::debug!(
                ranges = selection.ranges.len(),
                "[SelectionCapture] Multi-range selection, placing menu at first range"
            );
        }

        let position = self.config.place_menu(rect, viewport);
        self.menu = Some(OpenMenu {
            position,
            text: text.to_string(),
        });
        Some(position)
    }

    /// Closes the menu when `point` lies outside its bounds.
    ///
    /// Returns whether the menu was closed.
    pub fn dismiss_if_outside(&mut self, point: Point) -> bool {
        let Some(menu) = &self.menu else {
            return false;
        };
        if self.config.menu_bounds(menu.position).contains(point) {
            return false;
        }
        self.menu = None;
        true
    }

    pub fn dismiss(&mut self) {
        self.menu = None;
    }

    /// Invokes the menu action: closes the menu, clears the native
    /// selection and returns the captured text.
    pub fn invoke(&mut self) -> Option<String> {
        let menu = self.menu.take()?;
        self.source.clear_selection();
        tracing::debug!(
            chars = menu.text.chars().count(),
            "[SelectionCapture] Emitting selected text"
        );
        Some(menu.text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;
    use std::sync::atomic::{AtomicUsize, Ordering};

    const VIEWPORT: Viewport = Viewport {
        width: 1000.0,
        height: 800.0,
    };

    #[derive(Default)]
    struct FakePage {
        selection: Mutex<Option<PageSelection>>,
        clears: AtomicUsize,
    }

    impl FakePage {
        fn select(&self, text: &str, ranges: Vec<Rect>) {
            *self.selection.lock().unwrap() = Some(PageSelection {
                text: text.to_string(),
                ranges,
            });
        }

        fn current_selection_is_none(&self) -> bool {
            self.selection.lock().unwrap().is_none()
        }
    }

    impl SelectionSource for &FakePage {
        fn current_selection(&self) -> Option<PageSelection> {
            self.selection.lock().unwrap().clone()
        }

        fn clear_selection(&self) {
            *self.selection.lock().unwrap() = None;
            self.clears.fetch_add(1, Ordering::SeqCst);
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_pointer_up_opens_menu_below_selection() {
        let page = FakePage::default();
        page.select("zero moment point", vec![Rect::new(400.0, 100.0, 200.0, 20.0)]);
        let mut capture = SelectionCapture::new(&page, SelectionConfig::default());

        let position = capture.handle_event(PointerEvent::PointerUp, VIEWPORT).await;

        assert_eq!(position, Some(SelectionMenuPosition { x: 500.0, y: 128.0 }));
        assert_eq!(capture.pending_text(), Some("zero moment point"));
    }

    #[tokio::test(start_paused = true)]
    async fn test_pointer_up_reads_selection_after_settle_delay() {
        let page = FakePage::default();
        page.select("zero", vec![Rect::new(100.0, 100.0, 100.0, 20.0)]);
        let mut capture = SelectionCapture::new(&page, SelectionConfig::default());

        let (position, ()) = tokio::join!(
            capture.handle_event(PointerEvent::PointerUp, VIEWPORT),
            async {
                tokio::time::sleep(Duration::from_millis(5)).await;
                page.select("zero moment point", vec![Rect::new(400.0, 100.0, 200.0, 20.0)]);
            }
        );

        assert_eq!(position, Some(SelectionMenuPosition { x: 500.0, y: 128.0 }));
        assert_eq!(capture.pending_text(), Some("zero moment point"));
    }

    #[tokio::test(start_paused = true)]
    async fn test_whitespace_selection_is_empty() {
        let page = FakePage::default();
        page.select("   \n\t", vec![Rect::new(400.0, 100.0, 200.0, 20.0)]);
        let mut capture = SelectionCapture::new(&page, SelectionConfig::default());

        assert_eq!(capture.handle_event(PointerEvent::TouchEnd, VIEWPORT).await, None);
        assert!(!capture.is_open());
    }

    #[test]
    fn test_zero_width_selection_clears_existing_menu() {
        let page = FakePage::default();
        page.select("text", vec![Rect::new(400.0, 100.0, 200.0, 20.0)]);
        let mut capture = SelectionCapture::new(&page, SelectionConfig::default());
        assert!(capture.refresh(VIEWPORT).is_some());

        page.select("text", vec![Rect::new(400.0, 100.0, 0.0, 20.0)]);
        assert_eq!(capture.refresh(VIEWPORT), None);
        assert!(!capture.is_open());
    }

    #[test]
    fn test_multi_range_uses_first_range() {
        let page = FakePage::default();
        page.select(
            "first second",
            vec![
                Rect::new(100.0, 100.0, 100.0, 20.0),
                Rect::new(700.0, 400.0, 100.0, 20.0),
            ],
        );
        let mut capture = SelectionCapture::new(&page, SelectionConfig::default());

        let position = capture.refresh(VIEWPORT).unwrap();

        assert_eq!(position, SelectionMenuPosition { x: 150.0, y: 128.0 });
    }

    #[tokio::test(start_paused = true)]
    async fn test_outside_pointer_down_closes_menu() {
        let page = FakePage::default();
        page.select("balance", vec![Rect::new(400.0, 100.0, 200.0, 20.0)]);
        let mut capture = SelectionCapture::new(&page, SelectionConfig::default());
        capture.refresh(VIEWPORT);

        let inside = capture
            .handle_event(PointerEvent::PointerDown(Point::new(500.0, 140.0)), VIEWPORT)
            .await;
        assert!(inside.is_some());

        let outside = capture
            .handle_event(PointerEvent::TouchStart(Point::new(10.0, 10.0)), VIEWPORT)
            .await;
        assert_eq!(outside, None);
        assert_eq!(page.clears.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_invoke_clears_selection_and_emits_text() {
        let page = FakePage::default();
        page.select("  inverse kinematics ", vec![Rect::new(400.0, 100.0, 200.0, 20.0)]);
        let mut capture = SelectionCapture::new(&page, SelectionConfig::default());
        capture.refresh(VIEWPORT);

        assert_eq!(capture.invoke(), Some("inverse kinematics".to_string()));
        assert!(!capture.is_open());
        assert_eq!(page.clears.load(Ordering::SeqCst), 1);
        assert!(page.current_selection_is_none());

        // A second invoke has nothing to emit.
        assert_eq!(capture.invoke(), None);
    }
}
