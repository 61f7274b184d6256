//! The chat panel: conversation list, one open thread, and the composer.
//!
//! Every action runs to completion before the next one starts (`&mut self`
//! across the awaits), so the only responses that can arrive late are the
//! poller's. Those are tagged with the thread generation and dropped by
//! [`ChatWidget::apply_pending_refreshes`] when they no longer match.
//!
//! Failures never leave the widget: each one is logged and lands in the
//! single last-error slot of [`WidgetState`].

use std::{
    fmt::Display,
    sync::{
        mpsc::{self, Receiver, Sender},
        Arc,
    },
    time::Duration,
};

use chrono::Utc;
use tokio::runtime::Handle;

use crate::domain::{
    conversation::ConversationSummary,
    conversation_list_state::ConversationListUiState,
    message::{Message, ThreadMessage},
    widget_state::{WidgetState, WidgetView},
};

use super::{
    contracts::ChatBackend,
    identity::IdentityStore,
    list_conversations::{list_conversations, ListConversationsError},
    load_messages::{load_messages, ConversationKey, LoadMessagesError},
    mark_read::ReadMarker,
    polling::{PollHandle, PollTarget, ThreadPoller, ThreadRefresh},
    send_message::{self as outgoing, SendMessageCommand, SendMessageError},
};

const CHAT_SUMMARIES_LOAD_FAILED: &str = "CHAT_SUMMARIES_LOAD_FAILED";
const CHAT_MARK_READ_FAILED: &str = "CHAT_MARK_READ_FAILED";
const CHAT_THREAD_LOAD_FAILED: &str = "CHAT_THREAD_LOAD_FAILED";
const CHAT_SEND_FAILED: &str = "CHAT_SEND_FAILED";
const CHAT_POLL_FAILED: &str = "CHAT_POLL_FAILED";
const CHAT_STALE_REFRESH_DROPPED: &str = "CHAT_STALE_REFRESH_DROPPED";
const CHAT_SESSION_ENDED: &str = "CHAT_SESSION_ENDED";

const NO_THREAD_OPEN: &str = "open a conversation first";

pub struct ChatWidget<A: ChatBackend> {
    backend: Arc<A>,
    identity: Arc<IdentityStore>,
    runtime: Handle,
    state: WidgetState,
    poll_interval: Duration,
    poller: Option<PollHandle>,
    refresh_tx: Sender<ThreadRefresh>,
    refresh_rx: Receiver<ThreadRefresh>,
    optimistic_sequence: u64,
}

impl<A: ChatBackend> ChatWidget<A> {
    pub fn new(
        backend: Arc<A>,
        identity: Arc<IdentityStore>,
        runtime: Handle,
        poll_interval: Duration,
    ) -> Self {
        let (refresh_tx, refresh_rx) = mpsc::channel();

        Self {
            backend,
            identity,
            runtime,
            state: WidgetState::default(),
            poll_interval,
            poller: None,
            refresh_tx,
            refresh_rx,
            optimistic_sequence: 0,
        }
    }

    pub fn state(&self) -> &WidgetState {
        &self.state
    }

    /// Local edits only (input text, selection, scrolling).
    pub fn state_mut(&mut self) -> &mut WidgetState {
        &mut self.state
    }

    pub fn current_email(&self) -> Option<String> {
        self.identity.current_email()
    }

    pub fn is_polling(&self) -> bool {
        self.poller.as_ref().is_some_and(PollHandle::is_active)
    }

    pub fn unread_total(&self) -> u32 {
        self.state.unread_total()
    }

    pub fn badge(&self) -> Option<u32> {
        self.state.badge()
    }

    pub fn last_error(&self) -> Option<&str> {
        self.state.last_error()
    }

    /// `closed -> open.list`. Anonymous users get the login prompt and no
    /// request is made.
    pub async fn open_widget(&mut self) {
        self.state.set_view(WidgetView::List);
        self.state.compose_mut().reset();
        self.state.clear_error();

        let Some(user_email) = self.identity.current_email() else {
            self.state.set_login_required(true);
            return;
        };
        self.state.set_login_required(false);
        // Opening starts from an empty list, so a failed load shows the error state.
        self.state.conversations_mut().set_loading();
        self.reload_conversations(&user_email).await;
    }

    pub fn close_widget(&mut self) {
        self.leave_thread();
        self.state.compose_mut().reset();
        self.state.set_login_required(false);
        self.state.set_view(WidgetView::Closed);
    }

    pub async fn refresh_conversations(&mut self) {
        let Some(user_email) = self.require_user() else {
            return;
        };
        self.state.clear_error();
        self.reload_conversations(&user_email).await;
    }

    /// `open.list -> open.thread`. Marks the thread read, refetches the
    /// summaries and loads the messages concurrently; any of the three may
    /// fail without holding back the others.
    pub async fn open_conversation(&mut self, other_user_email: &str) {
        let Some(user_email) = self.require_user() else {
            return;
        };
        let other_user_email = other_user_email.trim().to_owned();
        if other_user_email.is_empty() {
            return;
        }

        self.stop_polling();
        self.state.clear_error();
        self.state.compose_mut().reset();
        self.state.input_mut().clear();
        let generation = self.state.thread_mut().open(&other_user_email);
        self.state.set_view(WidgetView::Thread);

        let key = ConversationKey::new(&user_email, &other_user_email);
        let backend = Arc::clone(&self.backend);
        let (marked, summaries, messages) = tokio::join!(
            backend.mark_read(&user_email, &other_user_email),
            list_conversations(backend.as_ref(), &user_email),
            load_messages(backend.as_ref(), &key),
        );

        self.apply_summaries(summaries);
        match marked {
            // The refetch may have raced ahead of the server-side update.
            Ok(()) => self
                .state
                .conversations_mut()
                .mark_read_locally(&other_user_email),
            Err(error) => self.record_failure(CHAT_MARK_READ_FAILED, "mark read", &error),
        }
        self.apply_thread(messages);

        self.start_polling(key, generation);
    }

    pub async fn open_selected(&mut self) {
        let Some(other_user_email) = self
            .state
            .conversations()
            .selected()
            .map(|conversation| conversation.other_user_email.clone())
        else {
            return;
        };

        self.open_conversation(&other_user_email).await;
    }

    /// `open.thread -> open.list`.
    pub fn back_to_list(&mut self) {
        self.leave_thread();
        self.state.set_view(WidgetView::List);
    }

    /// Sends the input as an optimistic `Pending` message, then reconciles
    /// with the server or rolls the message back and restores the input.
    pub async fn send_message(&mut self) {
        let Some(user_email) = self.require_user() else {
            return;
        };
        let Some(other_user_email) = self.state.thread().other_user_email().map(str::to_owned)
        else {
            self.state.set_error(NO_THREAD_OPEN);
            return;
        };

        let typed = self.state.input().text();
        let text = typed.trim();
        if text.is_empty() {
            return;
        }

        self.state.clear_error();
        self.optimistic_sequence += 1;
        let pending =
            ThreadMessage::pending(&user_email, text, Utc::now(), self.optimistic_sequence);
        let local_id = pending.id().to_owned();
        self.state.thread_mut().push_pending(pending);
        self.state.input_mut().clear();

        let command = SendMessageCommand {
            sender_email: user_email.clone(),
            receiver_email: other_user_email.clone(),
            text: text.to_owned(),
        };
        let backend = Arc::clone(&self.backend);
        match outgoing::send_message(backend.as_ref(), command).await {
            Ok(_) => self.reload_after_send(&user_email, &other_user_email).await,
            Err(error) => {
                self.state.thread_mut().roll_back(&local_id);
                self.state.input_mut().set_text(&typed);
                self.record_failure(CHAT_SEND_FAILED, "send message", &error);
            }
        }
    }

    pub fn begin_compose(&mut self) {
        self.leave_thread();
        self.state.set_view(WidgetView::List);
        self.state.clear_error();
        self.state.compose_mut().begin();
    }

    pub fn cancel_compose(&mut self) {
        self.state.compose_mut().reset();
    }

    /// Starts a conversation from the composer. Without a first message
    /// nothing is created: the composer just closes.
    pub async fn start_new_chat(&mut self) {
        let Some(user_email) = self.require_user() else {
            return;
        };

        let recipient = self.state.compose().recipient_email();
        if recipient.is_empty() {
            self.state.set_error(SendMessageError::MissingRecipient.to_string());
            return;
        }

        let text = self.state.compose().first_message_text();
        if text.is_empty() {
            self.state.compose_mut().reset();
            self.state.clear_error();
            return;
        }

        self.state.clear_error();
        let command = SendMessageCommand {
            sender_email: user_email.clone(),
            receiver_email: recipient.clone(),
            text,
        };
        let backend = Arc::clone(&self.backend);
        if let Err(error) = outgoing::send_message(backend.as_ref(), command).await {
            self.record_failure(CHAT_SEND_FAILED, "start chat", &error);
            return;
        }
        self.state.compose_mut().reset();

        let summaries = list_conversations(backend.as_ref(), &user_email).await;
        self.apply_summaries(summaries);
        // Open by email even if the new summary has not shown up yet.
        let other_user_email = self
            .state
            .conversations()
            .find(&recipient)
            .map(|conversation| conversation.other_user_email.clone())
            .unwrap_or(recipient);

        self.open_conversation(&other_user_email).await;
    }

    /// Applies poll results that still belong to the open thread and drops
    /// the rest. Returns how many replaced the thread.
    pub fn apply_pending_refreshes(&mut self) -> usize {
        self.sync_identity();

        let mut applied = 0;
        while let Ok(refresh) = self.refresh_rx.try_recv() {
            if !self
                .state
                .thread()
                .accepts(refresh.generation, &refresh.other_user_email)
            {
                tracing::debug!(
                    code = CHAT_STALE_REFRESH_DROPPED,
                    generation = refresh.generation,
                    current_generation = self.state.thread().generation(),
                    "dropping poll result for a thread that is no longer open"
                );
                continue;
            }

            match refresh.result {
                Ok(messages) => {
                    self.state.thread_mut().replace_with_server(messages);
                    applied += 1;
                }
                Err(error) => self.record_failure(CHAT_POLL_FAILED, "refresh thread", &error),
            }
        }

        applied
    }

    fn require_user(&mut self) -> Option<String> {
        let email = self.identity.current_email();
        if email.is_none() {
            self.sync_identity();
            if self.state.is_open() {
                self.state.set_login_required(true);
            }
        }
        email
    }

    /// Tears the signed-in parts down once nobody is logged in any more.
    fn sync_identity(&mut self) {
        if self.identity.is_authenticated() {
            return;
        }

        let had_session = self.poller.is_some()
            || self.state.thread().is_open()
            || !self.state.conversations().conversations().is_empty();
        if !had_session {
            return;
        }

        self.leave_thread();
        self.state.compose_mut().reset();
        self.state.conversations_mut().set_loading();
        if self.state.is_open() {
            self.state.set_view(WidgetView::List);
            self.state.set_login_required(true);
        }

        tracing::info!(code = CHAT_SESSION_ENDED, "chat session ended; polling stopped");
    }

    async fn reload_conversations(&mut self, user_email: &str) {
        if self.state.conversations().ui_state() != ConversationListUiState::Ready {
            self.state.conversations_mut().set_loading();
        }

        let result = list_conversations(self.backend.as_ref(), user_email).await;
        self.apply_summaries(result);
    }

    async fn reload_after_send(&mut self, user_email: &str, other_user_email: &str) {
        let key = ConversationKey::new(user_email, other_user_email);
        let backend = Arc::clone(&self.backend);
        let (messages, summaries) = tokio::join!(
            load_messages(backend.as_ref(), &key),
            list_conversations(backend.as_ref(), user_email),
        );

        self.apply_thread(messages);
        self.apply_summaries(summaries);

        // Anything the running poller fetched predates this refetch.
        self.stop_polling();
        let generation = self.state.thread_mut().supersede_fetches();
        self.start_polling(key, generation);
    }

    /// A failed refetch keeps a list that is already on screen.
    fn apply_summaries(
        &mut self,
        result: Result<Vec<ConversationSummary>, ListConversationsError>,
    ) {
        match result {
            Ok(conversations) => self.state.conversations_mut().set_ready(conversations),
            Err(error) => {
                if self.state.conversations().ui_state() != ConversationListUiState::Ready {
                    self.state.conversations_mut().set_error();
                }
                self.record_failure(CHAT_SUMMARIES_LOAD_FAILED, "load conversations", &error);
            }
        }
    }

    fn apply_thread(&mut self, result: Result<Vec<Message>, LoadMessagesError>) {
        match result {
            Ok(messages) => self.state.thread_mut().replace_with_server(messages),
            Err(error) => {
                self.state.thread_mut().set_error();
                self.record_failure(CHAT_THREAD_LOAD_FAILED, "load messages", &error);
            }
        }
    }

    fn start_polling(&mut self, key: ConversationKey, generation: u64) {
        self.poller = Some(ThreadPoller::start(
            &self.runtime,
            Arc::clone(&self.backend),
            PollTarget { key, generation },
            self.poll_interval,
            self.refresh_tx.clone(),
        ));
    }

    fn stop_polling(&mut self) {
        if let Some(mut poller) = self.poller.take() {
            poller.cancel();
        }
    }

    fn leave_thread(&mut self) {
        self.stop_polling();
        self.state.thread_mut().close();
        self.state.input_mut().clear();
    }

    fn record_failure(&mut self, code: &'static str, action: &'static str, error: &dyn Display) {
        tracing::warn!(code, action, error = %error, "chat action failed");
        self.state.set_error(error.to_string());
    }
}

#[cfg(test)]
mod tests {
    use tokio::time;

    use super::*;
    use crate::{
        domain::{message::DeliveryState, thread_state::ThreadUiState},
        infra::stubs::MemoryIdentityStorage,
        test_support::{FakeCall, InMemoryMarketplace},
    };

    const POLL_INTERVAL: Duration = Duration::from_secs(3);

    fn identity(email: Option<&str>) -> Arc<IdentityStore> {
        let storage = match email {
            Some(email) => MemoryIdentityStorage::with_email(email),
            None => MemoryIdentityStorage::default(),
        };
        let store = IdentityStore::new(Box::new(storage));
        store.init();
        Arc::new(store)
    }

    fn widget_for(
        market: &Arc<InMemoryMarketplace>,
        identity: Arc<IdentityStore>,
    ) -> ChatWidget<InMemoryMarketplace> {
        ChatWidget::new(Arc::clone(market), identity, Handle::current(), POLL_INTERVAL)
    }

    fn signed_in(market: &Arc<InMemoryMarketplace>) -> ChatWidget<InMemoryMarketplace> {
        widget_for(market, identity(Some("a@ufl.edu")))
    }

    fn texts(widget: &ChatWidget<InMemoryMarketplace>) -> Vec<String> {
        widget
            .state()
            .thread()
            .messages()
            .iter()
            .map(|message| message.message.text.clone())
            .collect()
    }

    #[tokio::test]
    async fn anonymous_open_shows_login_prompt_without_requests() {
        let market = Arc::new(InMemoryMarketplace::default());
        let mut widget = widget_for(&market, identity(None));

        widget.open_widget().await;

        assert!(widget.state().login_required());
        assert_eq!(widget.state().view(), WidgetView::List);
        assert_eq!(market.calls(), 0);
    }

    #[tokio::test]
    async fn open_widget_loads_summaries_for_current_user() {
        let market = Arc::new(InMemoryMarketplace::default());
        market.seed_message("b@ufl.edu", "a@ufl.edu", "Is the room free?");
        let mut widget = signed_in(&market);
        assert_eq!(
            widget.state().conversations().ui_state(),
            ConversationListUiState::Loading
        );

        widget.open_widget().await;

        assert_eq!(
            widget.state().conversations().ui_state(),
            ConversationListUiState::Ready
        );
        assert_eq!(widget.unread_total(), 1);
        assert_eq!(widget.badge(), None);
        assert_eq!(market.call_count(FakeCall::ListConversations), 1);
    }

    #[tokio::test]
    async fn failed_open_leaves_empty_list_with_error() {
        let market = Arc::new(InMemoryMarketplace::default());
        market.fail_on(FakeCall::ListConversations);
        let mut widget = signed_in(&market);

        widget.open_widget().await;

        assert_eq!(
            widget.state().conversations().ui_state(),
            ConversationListUiState::Error
        );
        assert!(widget.state().conversations().conversations().is_empty());
        assert!(widget.last_error().is_some());
    }

    #[tokio::test]
    async fn opening_a_thread_clears_unread_and_loads_messages() {
        let market = Arc::new(InMemoryMarketplace::default());
        market.seed_message("b@ufl.edu", "a@ufl.edu", "Hello");
        market.seed_message("b@ufl.edu", "a@ufl.edu", "Still there?");
        let mut widget = signed_in(&market);
        widget.open_widget().await;
        assert_eq!(widget.unread_total(), 2);

        widget.open_conversation("b@ufl.edu").await;

        assert_eq!(widget.state().view(), WidgetView::Thread);
        assert_eq!(texts(&widget), vec!["Hello", "Still there?"]);
        assert_eq!(widget.unread_total(), 0);
        assert_eq!(market.call_count(FakeCall::MarkRead), 1);
        assert!(widget.is_polling());

        widget.close_widget();
        assert_eq!(widget.badge(), None);
    }

    #[tokio::test]
    async fn reopening_after_a_failed_load_drops_the_old_list() {
        let market = Arc::new(InMemoryMarketplace::default());
        market.seed_message("b@ufl.edu", "a@ufl.edu", "Hello");
        let mut widget = signed_in(&market);
        widget.open_widget().await;
        widget.close_widget();
        market.fail_on(FakeCall::ListConversations);

        widget.open_widget().await;

        assert_eq!(
            widget.state().conversations().ui_state(),
            ConversationListUiState::Error
        );
        assert!(widget.state().conversations().conversations().is_empty());
        assert!(widget.last_error().is_some());
    }

    #[tokio::test]
    async fn unread_stays_cleared_when_summaries_outrun_mark_read() {
        let market = Arc::new(InMemoryMarketplace::default().with_lagging_mark_read());
        market.seed_message("b@ufl.edu", "a@ufl.edu", "Hello");
        market.seed_message("b@ufl.edu", "a@ufl.edu", "Still there?");
        let mut widget = signed_in(&market);
        widget.open_widget().await;
        assert_eq!(widget.unread_total(), 2);

        widget.open_conversation("b@ufl.edu").await;

        let conversation = widget
            .state()
            .conversations()
            .find("b@ufl.edu")
            .expect("conversation with b listed");
        assert_eq!(conversation.unread_count, 0);
        assert_eq!(widget.unread_total(), 0);

        widget.close_widget();
        assert_eq!(widget.badge(), None);
    }

    #[tokio::test]
    async fn server_reports_thread_read_on_next_refresh() {
        let market = Arc::new(InMemoryMarketplace::default().with_lagging_mark_read());
        market.seed_message("b@ufl.edu", "a@ufl.edu", "Hello");
        let mut widget = signed_in(&market);
        widget.open_widget().await;
        widget.open_conversation("b@ufl.edu").await;
        widget.back_to_list();

        widget.refresh_conversations().await;

        let conversation = widget
            .state()
            .conversations()
            .find("b@ufl.edu")
            .expect("conversation with b listed");
        assert_eq!(conversation.unread_count, 0);
        assert_eq!(market.call_count(FakeCall::ListConversations), 3);
    }

    #[tokio::test]
    async fn thread_loads_even_when_mark_read_and_refetch_fail() {
        let market = Arc::new(InMemoryMarketplace::default());
        market.seed_message("b@ufl.edu", "a@ufl.edu", "Hello");
        let mut widget = signed_in(&market);
        widget.open_widget().await;
        market.fail_on(FakeCall::MarkRead);
        market.fail_on(FakeCall::ListConversations);

        widget.open_conversation("b@ufl.edu").await;

        assert_eq!(texts(&widget), vec!["Hello"]);
        assert_eq!(widget.state().thread().ui_state(), ThreadUiState::Ready);
        assert!(widget.last_error().is_some());
        assert_eq!(
            widget.state().conversations().ui_state(),
            ConversationListUiState::Ready
        );
    }

    #[tokio::test]
    async fn sent_message_is_confirmed_and_reaches_the_recipient() {
        let market = Arc::new(InMemoryMarketplace::default());
        let mut widget = signed_in(&market);
        widget.open_widget().await;
        widget.open_conversation("b@ufl.edu").await;
        widget.state_mut().input_mut().set_text("Hi");

        widget.send_message().await;

        let messages = widget.state().thread().messages();
        assert_eq!(messages.len(), 1);
        assert_eq!(messages[0].message.text, "Hi");
        assert_eq!(messages[0].message.sender, "a@ufl.edu");
        assert_eq!(messages[0].delivery, DeliveryState::Confirmed);
        assert!(widget.state().input().is_empty());

        let mine = widget
            .state()
            .conversations()
            .find("b@ufl.edu")
            .expect("conversation with b listed");
        assert_eq!(mine.last_message, "Hi");

        let theirs = list_conversations(market.as_ref(), "b@ufl.edu")
            .await
            .expect("b's conversations");
        assert_eq!(theirs[0].other_user_email, "a@ufl.edu");
        assert_eq!(theirs[0].last_message, "Hi");
        assert!(theirs[0].unread_count >= 1);
    }

    #[tokio::test]
    async fn failed_send_rolls_back_and_restores_input() {
        let market = Arc::new(InMemoryMarketplace::default());
        market.seed_message("b@ufl.edu", "a@ufl.edu", "Hello");
        let mut widget = signed_in(&market);
        widget.open_widget().await;
        widget.open_conversation("b@ufl.edu").await;
        market.fail_on(FakeCall::SendMessage);
        widget.state_mut().input_mut().set_text("  Is it furnished? ");

        widget.send_message().await;

        assert_eq!(texts(&widget), vec!["Hello"]);
        assert_eq!(widget.state().thread().pending_count(), 0);
        assert_eq!(widget.state().input().text(), "  Is it furnished? ");
        assert!(widget.last_error().is_some());

        market.recover(FakeCall::SendMessage);
        widget.send_message().await;

        assert_eq!(texts(&widget), vec!["Hello", "Is it furnished?"]);
        assert_eq!(widget.last_error(), None);
        assert!(widget.state().input().is_empty());
    }

    #[tokio::test]
    async fn blank_input_sends_nothing() {
        let market = Arc::new(InMemoryMarketplace::default());
        let mut widget = signed_in(&market);
        widget.open_widget().await;
        widget.open_conversation("b@ufl.edu").await;
        widget.state_mut().input_mut().set_text("   ");

        widget.send_message().await;

        assert_eq!(market.call_count(FakeCall::SendMessage), 0);
        assert!(widget.state().thread().messages().is_empty());
    }

    #[tokio::test]
    async fn send_without_open_thread_is_rejected() {
        let market = Arc::new(InMemoryMarketplace::default());
        let mut widget = signed_in(&market);
        widget.open_widget().await;
        widget.state_mut().input_mut().set_text("Hi");

        widget.send_message().await;

        assert_eq!(widget.last_error(), Some(NO_THREAD_OPEN));
        assert_eq!(market.call_count(FakeCall::SendMessage), 0);
    }

    #[tokio::test]
    async fn new_chat_without_first_message_creates_nothing() {
        let market = Arc::new(InMemoryMarketplace::default());
        let mut widget = signed_in(&market);
        widget.open_widget().await;
        let calls_before = market.calls();
        widget.begin_compose();
        widget.state_mut().compose_mut().fill("b@ufl.edu", "   ");

        widget.start_new_chat().await;

        assert_eq!(market.calls(), calls_before);
        assert!(!widget.state().compose().is_active());
        assert_eq!(widget.state().view(), WidgetView::List);
    }

    #[tokio::test]
    async fn new_chat_requires_recipient() {
        let market = Arc::new(InMemoryMarketplace::default());
        let mut widget = signed_in(&market);
        widget.open_widget().await;
        let calls_before = market.calls();
        widget.begin_compose();
        widget.state_mut().compose_mut().fill("  ", "Hi");

        widget.start_new_chat().await;

        assert_eq!(market.calls(), calls_before);
        assert!(widget.state().compose().is_active());
        assert_eq!(widget.last_error(), Some("recipient email is required"));
    }

    #[tokio::test]
    async fn new_chat_with_first_message_opens_the_thread() {
        let market = Arc::new(InMemoryMarketplace::default());
        let mut widget = signed_in(&market);
        widget.open_widget().await;
        widget.begin_compose();
        widget.state_mut().compose_mut().fill("b@ufl.edu", "Hi");

        widget.start_new_chat().await;

        assert_eq!(widget.state().view(), WidgetView::Thread);
        assert_eq!(widget.state().thread().other_user_email(), Some("b@ufl.edu"));
        assert_eq!(texts(&widget), vec!["Hi"]);
        assert!(!widget.state().compose().is_active());
        assert!(widget.state().conversations().find("b@ufl.edu").is_some());
    }

    #[tokio::test]
    async fn stale_poll_results_are_dropped() {
        let market = Arc::new(InMemoryMarketplace::default());
        market.seed_message("b@ufl.edu", "a@ufl.edu", "Hello");
        let mut widget = signed_in(&market);
        widget.open_widget().await;
        widget.open_conversation("c@ufl.edu").await;
        let old_generation = widget.state().thread().generation();
        widget.open_conversation("b@ufl.edu").await;
        let generation = widget.state().thread().generation();
        let bogus = vec![Message {
            id: "99".to_owned(),
            sender: "c@ufl.edu".to_owned(),
            text: "from another thread".to_owned(),
            timestamp: Utc::now(),
        }];

        for (generation, other_user_email) in [
            (old_generation, "c@ufl.edu"),
            (old_generation, "b@ufl.edu"),
            (generation, "c@ufl.edu"),
        ] {
            widget
                .refresh_tx
                .send(ThreadRefresh {
                    generation,
                    other_user_email: other_user_email.to_owned(),
                    result: Ok(bogus.clone()),
                })
                .expect("receiver alive");
        }

        assert_eq!(widget.apply_pending_refreshes(), 0);
        assert_eq!(texts(&widget), vec!["Hello"]);
    }

    #[tokio::test(start_paused = true)]
    async fn poll_brings_in_new_messages() {
        let market = Arc::new(InMemoryMarketplace::default());
        let mut widget = signed_in(&market);
        widget.open_widget().await;
        widget.open_conversation("b@ufl.edu").await;
        market.seed_message("b@ufl.edu", "a@ufl.edu", "Are you there?");

        time::sleep(POLL_INTERVAL + Duration::from_millis(100)).await;

        assert_eq!(widget.apply_pending_refreshes(), 1);
        assert_eq!(texts(&widget), vec!["Are you there?"]);
    }

    #[tokio::test(start_paused = true)]
    async fn poll_fetched_before_send_does_not_erase_sent_message() {
        let market = Arc::new(InMemoryMarketplace::default());
        let mut widget = signed_in(&market);
        widget.open_widget().await;
        widget.open_conversation("b@ufl.edu").await;
        time::sleep(POLL_INTERVAL + Duration::from_millis(100)).await;
        widget.state_mut().input_mut().set_text("Hi");

        widget.send_message().await;
        assert_eq!(widget.apply_pending_refreshes(), 0);
        assert_eq!(texts(&widget), vec!["Hi"]);
        assert!(widget.is_polling());

        market.seed_message("b@ufl.edu", "a@ufl.edu", "Hey!");
        time::sleep(POLL_INTERVAL + Duration::from_millis(100)).await;

        assert_eq!(widget.apply_pending_refreshes(), 1);
        assert_eq!(texts(&widget), vec!["Hi", "Hey!"]);
    }

    #[tokio::test(start_paused = true)]
    async fn polling_stops_on_every_exit_from_the_thread() {
        let market = Arc::new(InMemoryMarketplace::default());
        let mut widget = signed_in(&market);
        widget.open_widget().await;

        widget.open_conversation("b@ufl.edu").await;
        widget.back_to_list();
        assert!(!widget.is_polling());

        widget.open_conversation("b@ufl.edu").await;
        widget.close_widget();
        assert!(!widget.is_polling());

        widget.open_widget().await;
        widget.open_conversation("b@ufl.edu").await;
        widget.begin_compose();
        assert!(!widget.is_polling());

        let polls_before = market.call_count(FakeCall::LoadMessages);
        time::sleep(POLL_INTERVAL * 3).await;
        assert_eq!(market.call_count(FakeCall::LoadMessages), polls_before);
    }

    #[tokio::test]
    async fn logout_stops_polling_and_shows_login_prompt() {
        let market = Arc::new(InMemoryMarketplace::default());
        let identity = identity(Some("a@ufl.edu"));
        let mut widget = widget_for(&market, Arc::clone(&identity));
        widget.open_widget().await;
        widget.open_conversation("b@ufl.edu").await;
        assert!(widget.is_polling());

        identity.logout().expect("logout");
        widget.apply_pending_refreshes();

        assert!(!widget.is_polling());
        assert!(!widget.state().thread().is_open());
        assert!(widget.state().login_required());
        assert_eq!(widget.state().view(), WidgetView::List);
    }
}
