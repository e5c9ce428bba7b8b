use std::sync::Arc;

use knowyourbody_core::body_map::{self, BodyRegion, VIEW_BOX};
use knowyourbody_core::{ChatBackend, ChatController, Conversation, PendingTurn};
use ratatui::layout::Rect;
use tokio::sync::mpsc;
use tracing::{debug, info};

use crate::content;
use crate::tui::AppEvent;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Page {
    Home,
    Learn,
    Chat,
    About,
}

impl Page {
    pub const ALL: [Page; 4] = [Page::Home, Page::Learn, Page::Chat, Page::About];

    pub fn title(&self) -> &'static str {
        match self {
            Page::Home => "Home",
            Page::Learn => "Learn",
            Page::Chat => "Chat",
            Page::About => "About",
        }
    }

    /// Page bound to a number key ('1'..='4')
    pub fn from_digit(c: char) -> Option<Self> {
        let idx = c.to_digit(10)? as usize;
        Self::ALL.get(idx.checked_sub(1)?).copied()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputMode {
    Normal,
    Editing,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FocusPane {
    BodyMap,
    History,
}

/// Everything that lives only as long as the Chat page is open.
pub struct ChatView {
    pub controller: Arc<ChatController>,
    /// Tags change events so a left-behind conversation cannot touch this view
    pub generation: u64,
    pub conversation: Conversation,
    pub input: String,
    pub cursor: usize, // cursor position in input, in chars
    pub scroll: u16,
    /// Pin the history to its last line; render resolves the offset
    pub follow: bool,
    pub focus: FocusPane,
    pub highlighted: BodyRegion,
    pub tip: &'static str,
    pub body_map_area: Option<Rect>,
    pub history_area: Option<Rect>,
}

impl ChatView {
    fn new(controller: Arc<ChatController>, generation: u64) -> Self {
        let conversation = controller.snapshot();
        Self {
            controller,
            generation,
            conversation,
            input: String::new(),
            cursor: 0,
            scroll: 0,
            follow: true,
            focus: FocusPane::BodyMap,
            highlighted: BodyRegion::Head,
            tip: content::random_tip(),
            body_map_area: None,
            history_area: None,
        }
    }

    pub fn is_busy(&self) -> bool {
        self.conversation.busy
    }

    /// Keep the newest message (or "Thinking...") in view. The wrapped line
    /// count is only known at render time, so the offset is settled there.
    pub fn scroll_to_bottom(&mut self) {
        self.follow = true;
    }

    pub fn scroll_down(&mut self, lines: u16) {
        self.follow = false;
        self.scroll = self.scroll.saturating_add(lines);
    }

    pub fn scroll_up(&mut self, lines: u16) {
        self.follow = false;
        self.scroll = self.scroll.saturating_sub(lines);
    }
}

pub struct App {
    pub should_quit: bool,
    pub page: Page,
    pub input_mode: InputMode,
    pub show_profile_modal: bool,
    pub home_selection: usize,
    pub learn_scroll: u16,

    // Animation state
    pub animation_frame: u8, // 0-2 for ellipsis animation

    // Chat page state, present only while the page is open
    pub chat: Option<ChatView>,

    // Header tab areas for mouse hit-testing (updated during render)
    pub tab_areas: Vec<(Page, Rect)>,

    pub model_name: String,
    chat_generation: u64,
    backend: Arc<dyn ChatBackend>,
    events: mpsc::UnboundedSender<AppEvent>,
}

impl App {
    pub fn new(
        backend: Arc<dyn ChatBackend>,
        model_name: impl Into<String>,
        events: mpsc::UnboundedSender<AppEvent>,
    ) -> Self {
        Self {
            should_quit: false,
            page: Page::Home,
            input_mode: InputMode::Normal,
            show_profile_modal: false,
            home_selection: 0,
            learn_scroll: 0,
            animation_frame: 0,
            chat: None,
            tab_areas: Vec::new(),
            model_name: model_name.into(),
            chat_generation: 0,
            backend,
            events,
        }
    }

    /// Switch pages. Entering Chat opens a fresh conversation; leaving it
    /// drops the conversation and its assistant session.
    pub fn navigate(&mut self, page: Page) {
        if page == self.page {
            return;
        }
        debug!(from = self.page.title(), to = page.title(), "navigate");

        if self.page == Page::Chat {
            self.chat = None;
            self.show_profile_modal = false;
        }
        self.input_mode = InputMode::Normal;
        self.page = page;

        if page == Page::Chat {
            self.open_chat();
        }
    }

    fn open_chat(&mut self) {
        let controller = ChatController::new(Arc::clone(&self.backend));
        self.chat_generation += 1;
        let generation = self.chat_generation;

        // Forward store changes into the event loop until the store is dropped
        let mut rx = controller.subscribe();
        let tx = self.events.clone();
        tokio::spawn(async move {
            while rx.changed().await.is_ok() {
                if tx.send(AppEvent::ConversationChanged(generation)).is_err() {
                    break;
                }
            }
        });

        self.chat = Some(ChatView::new(controller, generation));
        self.input_mode = InputMode::Editing;
    }

    /// Pull the latest snapshot from the open conversation. Events from an
    /// earlier chat view (its reply landed after the user left) are ignored.
    pub fn refresh_conversation(&mut self, generation: u64) {
        let Some(chat) = self.chat.as_mut() else { return };
        if chat.generation != generation {
            debug!(generation, current = chat.generation, "stale conversation event");
            return;
        }
        chat.conversation = chat.controller.snapshot();
        chat.scroll_to_bottom();
    }

    /// Submit the input field. Dropped if blank or a reply is pending.
    pub fn submit_input(&mut self) {
        let Some(chat) = self.chat.as_mut() else { return };
        if chat.controller.is_busy() || chat.input.trim().is_empty() {
            return;
        }

        let text = chat.input.clone();
        if let Ok(pending) = chat.controller.begin_turn(&text) {
            chat.input.clear();
            chat.cursor = 0;
            self.dispatch(pending);
        }
    }

    pub fn select_region(&mut self, region: BodyRegion) {
        let Some(chat) = self.chat.as_mut() else { return };
        chat.highlighted = region;
        info!(region = region.label(), "body region selected");
        if let Ok(pending) = chat.controller.begin_turn(&region.prompt()) {
            self.dispatch(pending);
        }
    }

    fn dispatch(&mut self, pending: PendingTurn) {
        self.refresh_conversation(self.chat_generation);
        tokio::spawn(pending.complete());
    }

    /// Tick animation frame (called by Tick event)
    pub fn tick_animation(&mut self) {
        if self.chat.as_ref().is_some_and(ChatView::is_busy) {
            self.animation_frame = (self.animation_frame + 1) % 3;
        }
    }
}

/// Inner area of the body map panel that the view box is scaled onto
pub fn figure_area(panel: Rect) -> Rect {
    Rect {
        x: panel.x + 1,
        y: panel.y + 1,
        width: panel.width.saturating_sub(2),
        height: panel.height.saturating_sub(2),
    }
}

/// Cells covered by a region when the view box is stretched over `area`
pub fn region_rect(area: Rect, region: BodyRegion) -> Rect {
    let b = region.bounds();
    let sx = area.width as f32 / VIEW_BOX.0;
    let sy = area.height as f32 / VIEW_BOX.1;

    let x0 = (b.x * sx).floor() as u16;
    let y0 = (b.y * sy).floor() as u16;
    let x1 = ((b.x + b.width) * sx).floor().max(x0 as f32 + 1.0) as u16;
    let y1 = ((b.y + b.height) * sy).floor().max(y0 as f32 + 1.0) as u16;

    Rect {
        x: area.x + x0,
        y: area.y + y0,
        width: (x1 - x0).min(area.width.saturating_sub(x0)),
        height: (y1 - y0).min(area.height.saturating_sub(y0)),
    }
}

/// Region under a terminal cell, if any
pub fn region_at_cell(area: Rect, column: u16, row: u16) -> Option<BodyRegion> {
    if area.width == 0 || area.height == 0 || !point_in_rect(column, row, area) {
        return None;
    }
    let vx = (column - area.x) as f32 + 0.5;
    let vy = (row - area.y) as f32 + 0.5;
    body_map::region_at(
        vx / area.width as f32 * VIEW_BOX.0,
        vy / area.height as f32 * VIEW_BOX.1,
    )
}

/// Check if a point is within a rectangle
pub fn point_in_rect(x: u16, y: u16, rect: Rect) -> bool {
    x >= rect.x && x < rect.x + rect.width && y >= rect.y && y < rect.y + rect.height
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use knowyourbody_core::persona::GREETING;
    use knowyourbody_core::{RemoteCallError, Sender, SessionHandle};

    #[test]
    fn test_page_from_digit() {
        assert_eq!(Page::from_digit('1'), Some(Page::Home));
        assert_eq!(Page::from_digit('3'), Some(Page::Chat));
        assert_eq!(Page::from_digit('0'), None);
        assert_eq!(Page::from_digit('5'), None);
        assert_eq!(Page::from_digit('x'), None);
    }

    #[test]
    fn test_region_rect_center_maps_back() {
        let area = Rect::new(3, 2, 60, 120);
        for region in BodyRegion::ALL {
            let r = region_rect(area, region);
            assert!(r.width >= 3 && r.height >= 3, "{region} too small: {r:?}");
            let cx = r.x + r.width / 2;
            let cy = r.y + r.height / 2;
            assert_eq!(region_at_cell(area, cx, cy), Some(region), "{region}");
        }
    }

    #[test]
    fn test_region_rect_stays_in_area() {
        let area = Rect::new(0, 0, 17, 23);
        for region in BodyRegion::ALL {
            let r = region_rect(area, region);
            assert!(r.x + r.width <= area.width && r.y + r.height <= area.height, "{region}");
        }
    }

    #[test]
    fn test_cell_outside_area_hits_nothing() {
        let area = Rect::new(10, 10, 20, 40);
        assert_eq!(region_at_cell(area, 5, 20), None);
        assert_eq!(region_at_cell(Rect::new(0, 0, 0, 0), 0, 0), None);
    }

    fn test_app(backend: Arc<dyn ChatBackend>) -> (App, mpsc::UnboundedReceiver<AppEvent>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (App::new(backend, "test-model", tx), rx)
    }

    fn chat_app(backend: Arc<dyn ChatBackend>) -> (App, mpsc::UnboundedReceiver<AppEvent>) {
        let (mut app, rx) = test_app(backend);
        app.navigate(Page::Chat);
        (app, rx)
    }

    #[tokio::test]
    async fn test_submit_input_clears_field_when_accepted() {
        let (mut app, _rx) = chat_app(Arc::new(SilentBackend));
        let chat = app.chat.as_mut().unwrap();
        chat.input = "How do I sleep better?".to_string();
        chat.cursor = 22;

        app.submit_input();

        let chat = app.chat.as_ref().unwrap();
        assert!(chat.input.is_empty());
        assert_eq!(chat.cursor, 0);
        assert!(chat.is_busy());
        assert_eq!(chat.conversation.len(), 2);
        assert_eq!(chat.conversation.messages[1].text, "How do I sleep better?");
    }

    #[tokio::test]
    async fn test_submit_input_keeps_blank_field() {
        let (mut app, _rx) = chat_app(Arc::new(SilentBackend));
        let chat = app.chat.as_mut().unwrap();
        chat.input = "   ".to_string();
        chat.cursor = 3;

        app.submit_input();

        let chat = app.chat.as_ref().unwrap();
        assert_eq!(chat.input, "   ");
        assert_eq!(chat.cursor, 3);
        assert!(!chat.controller.is_busy());
        assert_eq!(chat.controller.snapshot().len(), 1);
    }

    #[tokio::test]
    async fn test_submit_input_keeps_field_while_busy() {
        let (mut app, _rx) = chat_app(Arc::new(SilentBackend));
        app.chat.as_mut().unwrap().input = "first".to_string();
        app.submit_input();

        let chat = app.chat.as_mut().unwrap();
        chat.input = "second".to_string();
        chat.cursor = 6;
        app.submit_input();

        let chat = app.chat.as_ref().unwrap();
        assert_eq!(chat.input, "second");
        assert_eq!(chat.cursor, 6);
        assert_eq!(chat.controller.snapshot().len(), 2);
    }

    #[tokio::test]
    async fn test_entering_chat_starts_fresh_conversation() {
        let (mut app, _rx) = chat_app(Arc::new(SilentBackend));
        assert_eq!(app.input_mode, InputMode::Editing);
        let first = Arc::clone(&app.chat.as_ref().unwrap().controller);
        assert_eq!(first.snapshot().len(), 1);
        assert_eq!(first.snapshot().messages[0].text, GREETING);

        app.chat.as_mut().unwrap().input = "hello".to_string();
        app.submit_input();
        assert_eq!(first.snapshot().len(), 2);

        app.navigate(Page::Home);
        assert!(app.chat.is_none());
        assert_eq!(app.input_mode, InputMode::Normal);

        app.navigate(Page::Chat);
        let second = &app.chat.as_ref().unwrap().controller;
        assert!(!Arc::ptr_eq(&first, second));
        let snapshot = second.snapshot();
        assert_eq!(snapshot.len(), 1);
        assert_eq!(snapshot.messages[0].text, GREETING);
        assert!(!snapshot.busy);
    }

    #[tokio::test]
    async fn test_leaving_chat_closes_modal() {
        let (mut app, _rx) = chat_app(Arc::new(SilentBackend));
        app.show_profile_modal = true;
        app.navigate(Page::About);
        assert!(app.chat.is_none());
        assert!(!app.show_profile_modal);
    }

    #[tokio::test]
    async fn test_select_region_sends_template_prompt() {
        let (mut app, _rx) = chat_app(Arc::new(SilentBackend));
        app.select_region(BodyRegion::Chest);

        let chat = app.chat.as_ref().unwrap();
        assert_eq!(chat.highlighted, BodyRegion::Chest);
        assert!(chat.is_busy());
        assert_eq!(chat.conversation.len(), 2);
        assert_eq!(chat.conversation.messages[1].sender, Sender::User);
        assert_eq!(chat.conversation.messages[1].text, BodyRegion::Chest.prompt());
    }

    #[tokio::test]
    async fn test_reply_event_refreshes_view() {
        let (mut app, mut rx) = chat_app(Arc::new(NullBackend));
        app.chat.as_mut().unwrap().input = "hi".to_string();
        app.submit_input();

        let generation = loop {
            match rx.recv().await {
                Some(AppEvent::ConversationChanged(generation)) => {
                    let done = !app.chat.as_ref().unwrap().controller.is_busy();
                    if done {
                        break generation;
                    }
                }
                Some(_) => {}
                None => panic!("event channel closed"),
            }
        };
        app.refresh_conversation(generation);

        let chat = app.chat.as_ref().unwrap();
        assert!(!chat.is_busy());
        assert_eq!(chat.conversation.len(), 3);
    }

    #[tokio::test]
    async fn test_stale_conversation_event_is_ignored() {
        let (mut app, _rx) = chat_app(Arc::new(SilentBackend));
        let stale = app.chat.as_ref().unwrap().generation;
        app.navigate(Page::Home);
        app.navigate(Page::Chat);

        let chat = app.chat.as_mut().unwrap();
        assert_ne!(chat.generation, stale);
        chat.scroll_up(1);
        chat.scroll_down(4);

        app.refresh_conversation(stale);

        let chat = app.chat.as_ref().unwrap();
        assert!(!chat.follow);
        assert_eq!(chat.scroll, 4);
    }

    #[test]
    fn test_manual_scroll_stops_following() {
        let controller = ChatController::new(Arc::new(NullBackend));
        let mut view = ChatView::new(controller, 1);
        assert!(view.follow);

        view.scroll_up(3);
        assert!(!view.follow);
        assert_eq!(view.scroll, 0);

        view.scroll_to_bottom();
        assert!(view.follow);
    }

    /// Replies immediately with an empty string.
    pub(crate) struct NullBackend;

    #[async_trait::async_trait]
    impl ChatBackend for NullBackend {
        async fn send_turn(
            &self,
            _session: &SessionHandle,
            _text: &str,
        ) -> Result<String, RemoteCallError> {
            Ok(String::new())
        }
    }

    /// Never replies, so a turn stays pending for the whole test.
    pub(crate) struct SilentBackend;

    #[async_trait::async_trait]
    impl ChatBackend for SilentBackend {
        async fn send_turn(
            &self,
            _session: &SessionHandle,
            _text: &str,
        ) -> Result<String, RemoteCallError> {
            std::future::pending().await
        }
    }
}
