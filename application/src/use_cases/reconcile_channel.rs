//! Channel access reconciliation.
//!
//! Before a channel-scoped chat operation may run, the acting bot must be a
//! member of the target channel. [`ChannelAccessReconciler::ensure`] brings a
//! fresh [`ChannelAccessReport`] from `Unknown` to `Settled` or `Failed`:
//!
//! 1. resolve the bot identity
//! 2. inspect the channel (privacy flag, members)
//! 3. already a member: settled immediately
//! 4. otherwise join (public) or invite the bot (private)
//! 5. after a join/invite, wait the settle interval, then settled
//!
//! The run completes before the guarded operation starts. Nothing is cached
//! between runs, so a bot removed from a channel since the last call is
//! detected and re-added. Runs targeting the same channel are serialized;
//! runs for different channels do not wait on each other.

use std::collections::HashMap;
use std::panic::AssertUnwindSafe;
use std::sync::{Arc, Mutex};

use futures::FutureExt;
use toolbridge_domain::channel::{ChannelAccessReport, ChannelAccessState, JoinMethod};
use toolbridge_domain::tool::ToolFailure;
use tracing::{debug, info, warn};

use crate::config::ReconcilerConfig;
use crate::ports::chat_platform::{ChatPlatformPort, PlatformError};
use crate::use_cases::effect_runner::panic_message;

/// Serializes reconciliation per channel and drives the state machine.
pub struct ChannelAccessReconciler {
    platform: Arc<dyn ChatPlatformPort>,
    config: ReconcilerConfig,
    channel_locks: Mutex<HashMap<String, Arc<tokio::sync::Mutex<()>>>>,
}

impl ChannelAccessReconciler {
    pub fn new(platform: Arc<dyn ChatPlatformPort>, config: ReconcilerConfig) -> Self {
        Self {
            platform,
            config,
            channel_locks: Mutex::new(HashMap::new()),
        }
    }

    pub fn config(&self) -> &ReconcilerConfig {
        &self.config
    }

    /// Guarantee the bot can act in `channel_id`.
    ///
    /// Returns the settled report, or an `AccessError` failure. A panic inside
    /// the platform client is contained and reported the same way.
    pub async fn ensure(&self, channel_id: &str) -> Result<ChannelAccessReport, ToolFailure> {
        let lock = self.channel_lock(channel_id);
        let result = {
            let _guard = lock.lock().await;
            let mut report = ChannelAccessReport::new(channel_id);
            let run = AssertUnwindSafe(self.reconcile(&mut report))
                .catch_unwind()
                .await;

            match run {
                Ok(Ok(())) => Ok(report),
                Ok(Err(failure)) => {
                    report.advance(ChannelAccessState::Failed);
                    warn!(channel = %channel_id, path = ?report.path, error = %failure, "Channel access failed");
                    Err(failure)
                }
                Err(panic) => {
                    report.advance(ChannelAccessState::Failed);
                    let message = panic_message(panic.as_ref());
                    warn!(channel = %channel_id, path = ?report.path, panic = %message, "Channel access panicked");
                    Err(ToolFailure::access(format!(
                        "Cannot access channel {}: {}",
                        channel_id, message
                    )))
                }
            }
        };
        self.release_channel_lock(channel_id, lock);
        result
    }

    async fn reconcile(&self, report: &mut ChannelAccessReport) -> Result<(), ToolFailure> {
        let channel_id = report.channel_id.clone();

        let identity = self
            .platform
            .identity()
            .await
            .map_err(|e| access_failure(&channel_id, "verify bot identity", e))?;
        report.bot_id = Some(identity.id.clone());
        report.advance(ChannelAccessState::IdentityVerified);
        debug!(channel = %channel_id, bot = %identity.id, "Bot identity verified");

        let mut channel = self
            .platform
            .channel_info(&channel_id)
            .await
            .map_err(|e| access_failure(&channel_id, "inspect channel", e))?;
        if channel.known_member_ids.is_none() {
            let members = self
                .platform
                .channel_members(&channel_id)
                .await
                .map_err(|e| access_failure(&channel_id, "list channel members", e))?;
            channel = channel.with_members(members);
        }
        report.advance(ChannelAccessState::ChannelInspected);

        if channel.has_member(&identity.id) == Some(true) {
            report.advance(ChannelAccessState::MembershipConfirmed);
            report.advance(ChannelAccessState::Settled);
            debug!(channel = %channel_id, "Bot already a member");
            return Ok(());
        }

        let method = if channel.is_private {
            self.platform
                .invite(&channel_id, &identity.id)
                .await
                .map_err(|e| access_failure(&channel_id, "invite bot into private channel", e))?;
            JoinMethod::Invite
        } else {
            self.platform
                .join(&channel_id)
                .await
                .map_err(|e| access_failure(&channel_id, "join channel", e))?;
            JoinMethod::Join
        };
        report.joined_via = Some(method);
        report.advance(ChannelAccessState::JoinAttempted);
        info!(
            channel = %channel_id,
            method = ?method,
            settle_ms = self.config.settle_interval.as_millis() as u64,
            "Bot added to channel, waiting for membership to settle"
        );

        // Membership is not visible to follow-up calls right away.
        // TODO: re-check membership after the wait and retry a bounded number of times.
        tokio::time::sleep(self.config.settle_interval).await;
        report.advance(ChannelAccessState::Settled);
        Ok(())
    }

    fn channel_lock(&self, channel_id: &str) -> Arc<tokio::sync::Mutex<()>> {
        let mut locks = self
            .channel_locks
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        locks
            .entry(channel_id.to_string())
            .or_insert_with(|| Arc::new(tokio::sync::Mutex::new(())))
            .clone()
    }

    /// Drop the map entry once no other run holds or waits for it.
    fn release_channel_lock(&self, channel_id: &str, lock: Arc<tokio::sync::Mutex<()>>) {
        let mut locks = self
            .channel_locks
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        // One reference in the map, one held here
        if Arc::strong_count(&lock) == 2 {
            locks.remove(channel_id);
        }
    }

    #[cfg(test)]
    fn tracked_channels(&self) -> usize {
        self.channel_locks
            .lock()
            .map(|locks| locks.len())
            .unwrap_or_default()
    }
}

fn access_failure(channel_id: &str, stage: &str, error: PlatformError) -> ToolFailure {
    ToolFailure::access(format!(
        "Cannot access channel {}: failed to {}: {}",
        channel_id, stage, error
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::collections::HashSet;
    use std::time::Duration;
    use tokio::time::Instant;
    use toolbridge_domain::channel::{BotIdentity, ChannelInfo};
    use toolbridge_domain::tool::FailureKind;

    use ChannelAccessState::*;

    const BOT: &str = "UBOT";
    const SETTLE: Duration = Duration::from_millis(500);

    /// Recording fake of a chat platform.
    ///
    /// A successful join/invite adds the bot to the channel's members, so a
    /// later run observes the membership.
    #[derive(Default)]
    struct MockPlatform {
        calls: Mutex<Vec<(String, Instant)>>,
        members: Mutex<HashMap<String, Vec<String>>>,
        private: HashSet<String>,
        fail_identity: bool,
        fail_join: bool,
        panic_on_info: bool,
    }

    impl MockPlatform {
        fn with_channel(self, id: &str, members: &[&str]) -> Self {
            self.members.lock().unwrap().insert(
                id.to_string(),
                members.iter().map(|m| m.to_string()).collect(),
            );
            self
        }

        fn with_private_channel(mut self, id: &str, members: &[&str]) -> Self {
            self.private.insert(id.to_string());
            self.with_channel(id, members)
        }

        fn record(&self, call: String) {
            self.calls.lock().unwrap().push((call, Instant::now()));
        }

        fn calls(&self) -> Vec<String> {
            self.calls.lock().unwrap().iter().map(|(c, _)| c.clone()).collect()
        }

        fn count(&self, prefix: &str) -> usize {
            self.calls().iter().filter(|c| c.starts_with(prefix)).count()
        }

        fn add_bot(&self, channel_id: &str) {
            if let Some(members) = self.members.lock().unwrap().get_mut(channel_id) {
                members.push(BOT.to_string());
            }
        }
    }

    #[async_trait]
    impl ChatPlatformPort for MockPlatform {
        async fn identity(&self) -> Result<BotIdentity, PlatformError> {
            self.record("identity".into());
            if self.fail_identity {
                return Err(PlatformError::Rejected("invalid_auth".into()));
            }
            Ok(BotIdentity::new(BOT))
        }

        async fn channel_info(&self, channel_id: &str) -> Result<ChannelInfo, PlatformError> {
            self.record(format!("info:{}", channel_id));
            if self.panic_on_info {
                panic!("client bug");
            }
            if !self.members.lock().unwrap().contains_key(channel_id) {
                return Err(PlatformError::NotFound("channel_not_found".into()));
            }
            Ok(if self.private.contains(channel_id) {
                ChannelInfo::private(channel_id)
            } else {
                ChannelInfo::public(channel_id)
            })
        }

        async fn channel_members(&self, channel_id: &str) -> Result<Vec<String>, PlatformError> {
            self.record(format!("members:{}", channel_id));
            Ok(self
                .members
                .lock()
                .unwrap()
                .get(channel_id)
                .cloned()
                .unwrap_or_default())
        }

        async fn join(&self, channel_id: &str) -> Result<(), PlatformError> {
            self.record(format!("join:{}", channel_id));
            if self.fail_join {
                return Err(PlatformError::Rejected("missing_scope".into()));
            }
            self.add_bot(channel_id);
            Ok(())
        }

        async fn invite(&self, channel_id: &str, user_id: &str) -> Result<(), PlatformError> {
            self.record(format!("invite:{}:{}", channel_id, user_id));
            self.add_bot(channel_id);
            Ok(())
        }
    }

    fn reconciler(platform: Arc<MockPlatform>) -> ChannelAccessReconciler {
        ChannelAccessReconciler::new(
            platform,
            ReconcilerConfig {
                settle_interval: SETTLE,
            },
        )
    }

    #[tokio::test(start_paused = true)]
    async fn test_member_settles_without_join() {
        let platform = Arc::new(MockPlatform::default().with_channel("C1", &["U1", BOT]));
        let reconciler = reconciler(platform.clone());

        let started = Instant::now();
        let report = reconciler.ensure("C1").await.unwrap();

        assert_eq!(
            report.path,
            vec![Unknown, IdentityVerified, ChannelInspected, MembershipConfirmed, Settled]
        );
        assert_eq!(report.bot_id.as_deref(), Some(BOT));
        assert!(report.joined_via.is_none());
        assert_eq!(platform.count("join"), 0);
        assert_eq!(platform.count("invite"), 0);
        assert!(started.elapsed() < SETTLE);
    }

    #[tokio::test(start_paused = true)]
    async fn test_public_channel_join_then_settle() {
        let platform = Arc::new(MockPlatform::default().with_channel("C1", &["U1"]));
        let reconciler = reconciler(platform.clone());

        let started = Instant::now();
        let report = reconciler.ensure("C1").await.unwrap();

        assert_eq!(
            report.path,
            vec![Unknown, IdentityVerified, ChannelInspected, JoinAttempted, Settled]
        );
        assert_eq!(report.joined_via, Some(JoinMethod::Join));
        assert_eq!(
            platform.calls(),
            vec!["identity", "info:C1", "members:C1", "join:C1"]
        );
        assert!(started.elapsed() >= SETTLE);
    }

    #[tokio::test(start_paused = true)]
    async fn test_second_run_performs_no_join() {
        let platform = Arc::new(MockPlatform::default().with_channel("C1", &["U1"]));
        let reconciler = reconciler(platform.clone());

        reconciler.ensure("C1").await.unwrap();
        let second = reconciler.ensure("C1").await.unwrap();

        assert_eq!(platform.count("join"), 1);
        assert_eq!(second.state(), Settled);
        assert!(second.path.contains(&MembershipConfirmed));
        assert_eq!(platform.count("identity"), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_private_channel_invites_bot() {
        let platform = Arc::new(MockPlatform::default().with_private_channel("G1", &["U1"]));
        let reconciler = reconciler(platform.clone());

        let report = reconciler.ensure("G1").await.unwrap();

        assert_eq!(report.joined_via, Some(JoinMethod::Invite));
        assert_eq!(platform.count("join"), 0);
        assert!(platform.calls().contains(&format!("invite:G1:{}", BOT)));
    }

    #[tokio::test(start_paused = true)]
    async fn test_missing_channel_fails_with_access_error() {
        let platform = Arc::new(MockPlatform::default());
        let reconciler = reconciler(platform.clone());

        let failure = reconciler.ensure("CNOPE").await.unwrap_err();

        assert_eq!(failure.kind, FailureKind::AccessError);
        assert!(failure.message.contains("channel_not_found"));
        assert_eq!(platform.calls(), vec!["identity", "info:CNOPE"]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_identity_failure_stops_before_inspection() {
        let platform = Arc::new(MockPlatform {
            fail_identity: true,
            ..MockPlatform::default()
        }
        .with_channel("C1", &[BOT]));
        let reconciler = reconciler(platform.clone());

        let failure = reconciler.ensure("C1").await.unwrap_err();

        assert_eq!(failure.kind, FailureKind::AccessError);
        assert!(failure.message.contains("invalid_auth"));
        assert_eq!(platform.calls(), vec!["identity"]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_join_failure_is_access_error() {
        let platform = Arc::new(MockPlatform {
            fail_join: true,
            ..MockPlatform::default()
        }
        .with_channel("C1", &[]));
        let reconciler = reconciler(platform.clone());

        let started = Instant::now();
        let failure = reconciler.ensure("C1").await.unwrap_err();

        assert_eq!(failure.kind, FailureKind::AccessError);
        assert!(failure.message.contains("missing_scope"));
        assert!(started.elapsed() < SETTLE);
    }

    #[tokio::test(start_paused = true)]
    async fn test_platform_panic_is_contained() {
        let platform = Arc::new(MockPlatform {
            panic_on_info: true,
            ..MockPlatform::default()
        });
        let reconciler = reconciler(platform);

        let failure = reconciler.ensure("C1").await.unwrap_err();

        assert_eq!(failure.kind, FailureKind::AccessError);
        assert!(failure.message.contains("client bug"));
    }

    #[tokio::test(start_paused = true)]
    async fn test_concurrent_runs_on_same_channel_join_once() {
        let platform = Arc::new(MockPlatform::default().with_channel("C1", &[]));
        let reconciler = reconciler(platform.clone());

        let (a, b) = tokio::join!(reconciler.ensure("C1"), reconciler.ensure("C1"));

        assert!(a.unwrap().is_settled());
        assert!(b.unwrap().is_settled());
        assert_eq!(platform.count("join"), 1);
        assert_eq!(reconciler.tracked_channels(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_different_channels_settle_in_parallel() {
        let platform = Arc::new(
            MockPlatform::default()
                .with_channel("C1", &[])
                .with_channel("C2", &[]),
        );
        let reconciler = reconciler(platform.clone());

        let started = Instant::now();
        let (a, b) = tokio::join!(reconciler.ensure("C1"), reconciler.ensure("C2"));

        assert!(a.is_ok() && b.is_ok());
        assert_eq!(platform.count("join"), 2);
        assert!(started.elapsed() < SETTLE * 2);
    }
}
