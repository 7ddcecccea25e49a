use crate::config::ControllerConfig;
use crate::domain::tv::{
    AdapterId, CecCommand, CecCommandRunner, CecInvocation, Delay, ExecutionResult, HdmiPort,
    InputSwitchPlan, PowerStatus, ReadinessCheck, TvControlError,
};
use crate::infrastructure::cec::{CecClientRunner, TokioDelay};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, error, info, warn};

/// Television control over HDMI-CEC through an external adapter client.
///
/// Operations run strictly one command at a time and each one completes
/// only after the client processes it spawned have exited or been killed.
/// The adapter is a single shared bus: callers that need concurrency must
/// serialize access (see `SharedCecController`).
///
/// No operation returns an error. Process faults come back as `false` or
/// `None` and are logged.
pub struct CecController {
    config: ControllerConfig,
    runner: Arc<dyn CecCommandRunner>,
    delay: Arc<dyn Delay>,
    adapter: Option<AdapterId>,
}

impl CecController {
    /// Uses the real `cec-client` process and the tokio timer
    pub async fn new(config: ControllerConfig) -> Self {
        let runner = Arc::new(CecClientRunner::from_config(&config));
        Self::with_ports(config, runner, Arc::new(TokioDelay::new())).await
    }

    /// Detects the adapter once. Construction never fails; an absent adapter
    /// is only recorded.
    pub async fn with_ports(
        config: ControllerConfig,
        runner: Arc<dyn CecCommandRunner>,
        delay: Arc<dyn Delay>,
    ) -> Self {
        let adapter = detect_adapter(runner.as_ref(), config.detect_timeout()).await;
        Self {
            config,
            runner,
            delay,
            adapter,
        }
    }

    pub fn adapter(&self) -> Option<AdapterId> {
        self.adapter
    }

    pub fn config(&self) -> &ControllerConfig {
        &self.config
    }

    /// Runs one invocation. Proceeds even without a detected adapter, since
    /// detection is unreliable on some setups.
    pub async fn execute(&self, invocation: &CecInvocation, timeout: Duration) -> ExecutionResult {
        if self.adapter.is_none() {
            warn!("CEC adapter not detected, but attempting command anyway");
        }
        self.runner.execute(invocation, timeout).await
    }

    async fn execute_command(&self, command: CecCommand) -> ExecutionResult {
        let invocation = CecInvocation::single(command);
        self.execute(&invocation, self.config.command_timeout()).await
    }

    /// Polls the power status until the TV reports `on` or `standby`,
    /// sleeping one poll interval after every unanswered query.
    pub async fn wait_for_ready(&self, max_attempts: u32) -> bool {
        info!("Waiting for TV to be ready...");

        for _ in 0..max_attempts {
            let result = self.execute_command(CecCommand::PowerStatus).await;
            if result.success && PowerStatus::parse(&result.output).is_some() {
                info!("TV is ready for commands");
                return true;
            }
            self.delay.sleep(self.config.ready_poll_interval()).await;
        }

        warn!("TV readiness check timed out");
        false
    }

    pub async fn query_power_status(&self) -> Option<PowerStatus> {
        let result = self.execute_command(CecCommand::PowerStatus).await;

        let status = if result.success {
            PowerStatus::parse(&result.output)
        } else {
            None
        };
        if status.is_none() {
            warn!(
                "Could not determine TV power status. Output: {}",
                result.output
            );
        }
        status
    }

    /// `Some(true)` when on, `Some(false)` in standby, `None` when unknown
    pub async fn power_status(&self) -> Option<bool> {
        self.query_power_status().await.map(|status| status.is_on())
    }

    pub async fn turn_on(&self) -> bool {
        info!("Turning on TV");
        let result = self.execute_command(CecCommand::PowerOn).await;

        if result.success {
            // Let the TV boot before anything else is sent
            self.delay.sleep(self.config.power_on_settle()).await;
            return true;
        }

        error!("Failed to turn on TV: {}", result.output);
        false
    }

    pub async fn turn_off(&self) -> bool {
        info!("Turning off TV");
        let result = self.execute_command(CecCommand::Standby).await;

        if result.success {
            return true;
        }

        error!("Failed to turn off TV: {}", result.output);
        false
    }

    /// Switches input trying four command formats per attempt, with a
    /// readiness wait up front and a backoff between attempts.
    pub async fn switch_input<D>(&self, device: D, retry_count: u32) -> bool
    where
        D: TryInto<HdmiPort, Error = TvControlError>,
    {
        let Some(port) = validate_device(device) else {
            return false;
        };
        info!("Switching to HDMI input {}", port);

        let plan = InputSwitchPlan::with_retries(
            port,
            retry_count,
            self.config.ready_max_attempts,
            self.config.switch_settle(),
            self.config.retry_backoff(),
        );
        crate::measure_time!("switch_input", { self.run_switch_plan(&plan).await })
    }

    /// Single pass over three command formats after a fixed delay
    pub async fn switch_input_simple<D>(&self, device: D) -> bool
    where
        D: TryInto<HdmiPort, Error = TvControlError>,
    {
        let Some(port) = validate_device(device) else {
            return false;
        };
        info!("Switching to HDMI input {}", port);

        let plan = InputSwitchPlan::simple(
            port,
            self.config.simple_pre_delay(),
            self.config.simple_settle(),
        );
        crate::measure_time!("switch_input_simple", { self.run_switch_plan(&plan).await })
    }

    /// Asks for the vendor id as a sign of life. The reply is not checked
    /// against `expected`.
    pub async fn verify_input_change(&self, expected: HdmiPort) -> bool {
        debug!("Verifying switch to HDMI input {}", expected);
        self.execute_command(CecCommand::GiveDeviceVendorId)
            .await
            .success
    }

    /// Success is decided by the adapter accepting a variant; verification
    /// only affects logging.
    pub async fn run_switch_plan(&self, plan: &InputSwitchPlan) -> bool {
        match plan.readiness {
            ReadinessCheck::WaitForReady { max_attempts } => {
                if !self.wait_for_ready(max_attempts).await {
                    warn!("Proceeding without TV readiness confirmation");
                }
            }
            ReadinessCheck::FixedDelay(duration) => self.delay.sleep(duration).await,
        }

        for attempt in 0..plan.attempts {
            info!("Attempt {} of {}", attempt + 1, plan.attempts);

            for (index, variant) in plan.variants.iter().enumerate() {
                debug!("Trying command format {}: {}", index + 1, variant);
                let result = self.execute(variant, self.config.command_timeout()).await;

                if result.success {
                    info!("Input switch command {} executed successfully", index + 1);
                    self.delay.sleep(plan.settle).await;

                    if plan.verify {
                        if self.verify_input_change(plan.port).await {
                            info!("Successfully switched to HDMI input {}", plan.port);
                        } else {
                            info!("Command executed but input change not verified");
                        }
                    }
                    return true;
                }

                warn!("Command format {} failed: {}", index + 1, result.output);
            }

            if attempt + 1 < plan.attempts {
                info!("Waiting before retry...");
                self.delay.sleep(plan.backoff).await;
            }
        }

        error!("All input switch attempts failed for device {}", plan.port);
        false
    }
}

async fn detect_adapter(runner: &dyn CecCommandRunner, timeout: Duration) -> Option<AdapterId> {
    let query = CecInvocation::single(CecCommand::PowerStatus);
    let result = runner.execute(&query, timeout).await;

    if result.success {
        info!("CEC adapter detected successfully");
        Some(AdapterId(0))
    } else if result.is_timeout() {
        error!("Failed to detect CEC adapter: {}", result.output);
        None
    } else {
        warn!("CEC adapter test failed: {}", result.output);
        None
    }
}

fn validate_device<D>(device: D) -> Option<HdmiPort>
where
    D: TryInto<HdmiPort, Error = TvControlError>,
{
    match device.try_into() {
        Ok(port) => Some(port),
        Err(e) => {
            error!("{}", e);
            None
        }
    }
}


#[cfg(test)]
mod tests {
    use super::test_support::*;
    use super::*;
    use crate::domain::tv::TIMEOUT_INDICATOR;
    use tracing_test::traced_test;

    fn ok(output: &str) -> ExecutionResult {
        ExecutionResult::succeeded(output)
    }

    fn fail() -> ExecutionResult {
        ExecutionResult::failed("no response")
    }

    fn secs(n: u64) -> Duration {
        Duration::from_secs(n)
    }

    fn defaults() -> ControllerConfig {
        ControllerConfig::default()
    }

    fn without_readiness_polls() -> ControllerConfig {
        ControllerConfig {
            ready_max_attempts: 0,
            ..ControllerConfig::default()
        }
    }

    #[tokio::test]
    #[traced_test]
    async fn test_adapter_detection() {
        let (present, _) = build_controller(defaults(), |_| ok("power status: on")).await;
        assert_eq!(present.adapter(), Some(AdapterId(0)));
        assert_eq!(present.config().client_program, "cec-client");
        assert!(logs_contain("CEC adapter detected successfully"));

        let (absent, log) = build_controller(defaults(), |_| ExecutionResult::timed_out()).await;
        assert_eq!(absent.adapter(), None);
        assert!(logs_contain("Failed to detect CEC adapter"));

        // Absence is advisory: commands still go out
        assert!(!absent.turn_off().await);
        assert_eq!(executions(&log), vec!["standby 0"]);
        assert!(logs_contain("attempting command anyway"));
    }

    #[tokio::test]
    async fn test_execute_reports_timeout() {
        let (controller, log) =
            build_controller(defaults(), |_| ExecutionResult::timed_out()).await;
        let result = controller
            .execute(
                &CecInvocation::single(CecCommand::PowerStatus),
                Duration::from_millis(100),
            )
            .await;
        assert!(!result.success);
        assert_eq!(result.output, TIMEOUT_INDICATOR);
        assert_eq!(executions(&log).len(), 1);
    }

    #[tokio::test]
    async fn test_power_status_parsing() {
        let (on, _) = build_controller(defaults(), |_| ok("POWER STATUS: ON")).await;
        assert_eq!(on.power_status().await, Some(true));

        let (standby, _) = build_controller(defaults(), |_| ok("Power Status: Standby")).await;
        assert_eq!(standby.power_status().await, Some(false));
        assert_eq!(standby.query_power_status().await, Some(PowerStatus::Standby));

        let (unknown, _) = build_controller(defaults(), |_| ok("power status: unknown")).await;
        assert_eq!(unknown.power_status().await, None);
    }

    #[tokio::test]
    #[traced_test]
    async fn test_power_status_failure_is_unknown() {
        // Output mentions "on" but the process failed
        let (controller, log) =
            build_controller(defaults(), |_| ExecutionResult::failed("power status: on")).await;
        assert_eq!(controller.power_status().await, None);
        assert_eq!(executions(&log), vec!["pow 0"]);
        assert!(logs_contain("Could not determine TV power status"));
    }

    #[tokio::test]
    async fn test_turn_on_waits_settle_delay() {
        let (controller, log) = build_controller(defaults(), |_| ok("")).await;
        assert!(controller.turn_on().await);
        assert_eq!(
            events(&log),
            vec![Event::Execute("on 0".into()), Event::Sleep(secs(3))]
        );
    }

    #[tokio::test]
    async fn test_turn_off_returns_without_delay() {
        let (controller, log) = build_controller(defaults(), |_| ok("")).await;
        assert!(controller.turn_off().await);
        assert_eq!(events(&log), vec![Event::Execute("standby 0".into())]);
    }

    #[tokio::test]
    #[traced_test]
    async fn test_power_commands_fail_without_retry() {
        let (controller, log) = build_controller(defaults(), |_| fail()).await;
        assert!(!controller.turn_on().await);
        assert!(!controller.turn_off().await);
        assert_eq!(
            events(&log),
            vec![
                Event::Execute("on 0".into()),
                Event::Execute("standby 0".into())
            ]
        );
        assert!(logs_contain("Failed to turn on TV: no response"));
        assert!(logs_contain("Failed to turn off TV: no response"));
    }

    #[tokio::test]
    async fn test_wait_for_ready_polls_until_answer() {
        let polls = Arc::new(std::sync::atomic::AtomicUsize::new(0));
        let counter = polls.clone();
        let (controller, log) = build_controller(defaults(), move |_| {
            // Adapter detection is the first call
            let n = counter.fetch_add(1, std::sync::atomic::Ordering::SeqCst);
            if n < 3 { fail() } else { ok("power status: standby") }
        })
        .await;

        assert!(controller.wait_for_ready(10).await);
        assert_eq!(
            events(&log),
            vec![
                Event::Execute("pow 0".into()),
                Event::Sleep(secs(1)),
                Event::Execute("pow 0".into()),
                Event::Sleep(secs(1)),
                Event::Execute("pow 0".into()),
            ]
        );
    }

    #[tokio::test]
    async fn test_wait_for_ready_sleeps_after_every_miss() {
        let (controller, log) = build_controller(defaults(), |_| ok("garbage")).await;
        assert!(!controller.wait_for_ready(4).await);
        assert_eq!(executions(&log).len(), 4);
        assert_eq!(sleeps(&log), vec![secs(1); 4]);
        assert_eq!(events(&log).last(), Some(&Event::Sleep(secs(1))));
    }

    #[tokio::test]
    #[traced_test]
    async fn test_invalid_device_issues_no_command() {
        let (controller, log) = build_controller(defaults(), |_| ok("power status: on")).await;

        assert!(!controller.switch_input(0i32, 3).await);
        assert!(!controller.switch_input(5i32, 3).await);
        assert!(!controller.switch_input(-2i32, 3).await);
        assert!(!controller.switch_input("abc", 3).await);
        assert!(!controller.switch_input("", 3).await);
        assert!(!controller.switch_input_simple(9u8).await);
        assert!(!controller.switch_input_simple("1.5").await);

        assert!(events(&log).is_empty());
        assert!(logs_contain("Must be 1-4"));
        assert!(logs_contain("Cannot convert to integer"));
    }

    #[tokio::test]
    async fn test_switch_input_first_variant_succeeds() {
        let (controller, log) = build_controller(defaults(), |_| ok("power status: on")).await;

        assert!(controller.switch_input("2", 3).await);
        assert_eq!(
            events(&log),
            vec![
                Event::Execute("pow 0".into()),
                Event::Execute("tx 1f:82:20:00".into()),
                Event::Sleep(secs(2)),
                Event::Execute("give_device_vendor_id".into()),
            ]
        );
    }

    #[tokio::test]
    #[traced_test]
    async fn test_switch_input_falls_through_variants() {
        let (controller, log) = build_controller(defaults(), |invocation| {
            match invocation.to_string().as_str() {
                "pow 0" => ok("power status: on"),
                "as && tx 1f:82:30:00" => ok(""),
                _ => fail(),
            }
        })
        .await;

        // Unverified switches still count as success
        assert!(controller.switch_input(3i32, 3).await);
        assert_eq!(
            executions(&log),
            vec![
                "pow 0",
                "tx 1f:82:30:00",
                "tx 10:82:30:00",
                "as && tx 1f:82:30:00",
                "give_device_vendor_id",
            ]
        );
        assert!(logs_contain("Command format 1 failed"));
        assert!(logs_contain("input change not verified"));
    }

    #[tokio::test]
    async fn test_switch_input_exhausts_attempts() {
        let (controller, log) = build_controller(without_readiness_polls(), |_| fail()).await;

        assert!(!controller.switch_input(1i32, 2).await);
        assert_eq!(executions(&log).len(), 2 * 4);
        assert_eq!(sleeps(&log), vec![secs(3)]);

        let attempt = vec![
            "tx 1f:82:10:00",
            "tx 10:82:10:00",
            "as && tx 1f:82:10:00",
            "tx 1f:82:10:00",
        ];
        let expected: Vec<String> = attempt
            .iter()
            .chain(attempt.iter())
            .map(|s| s.to_string())
            .collect();
        assert_eq!(executions(&log), expected);

        let events = events(&log);
        assert_eq!(events[4], Event::Sleep(secs(3)));
    }

    #[tokio::test]
    #[traced_test]
    async fn test_switch_input_proceeds_when_not_ready() {
        let config = ControllerConfig {
            ready_max_attempts: 2,
            ..ControllerConfig::default()
        };
        let (controller, log) = build_controller(config, |invocation| {
            if invocation.to_string() == "pow 0" { fail() } else { ok("") }
        })
        .await;

        assert!(controller.switch_input(4i32, 1).await);
        assert_eq!(
            executions(&log),
            vec!["pow 0", "pow 0", "tx 1f:82:40:00", "give_device_vendor_id"]
        );
        assert!(logs_contain("Proceeding without TV readiness confirmation"));
    }

    #[tokio::test]
    async fn test_switch_input_zero_retries() {
        let (controller, log) = build_controller(without_readiness_polls(), |_| ok("")).await;
        assert!(!controller.switch_input(1i32, 0).await);
        assert!(executions(&log).is_empty());
    }

    #[tokio::test]
    async fn test_switch_input_simple_succeeds() {
        let (controller, log) = build_controller(defaults(), |invocation| {
            if invocation.to_string() == "tx 1F:82:20:00" { ok("") } else { fail() }
        })
        .await;

        assert!(controller.switch_input_simple(2i32).await);
        assert_eq!(
            events(&log),
            vec![
                Event::Sleep(secs(2)),
                Event::Execute("tx 1f:82:20:00".into()),
                Event::Execute("tx 10:82:20:00".into()),
                Event::Execute("tx 1F:82:20:00".into()),
                Event::Sleep(secs(3)),
            ]
        );
    }

    #[tokio::test]
    #[traced_test]
    async fn test_switch_input_simple_all_fail() {
        let (controller, log) = build_controller(defaults(), |_| fail()).await;

        assert!(!controller.switch_input_simple("3").await);
        assert_eq!(executions(&log).len(), 3);
        assert_eq!(sleeps(&log), vec![secs(2)]);
        assert!(logs_contain("All input switch attempts failed for device 3"));
    }

    #[tokio::test]
    async fn test_verify_input_change_uses_vendor_query() {
        let port = HdmiPort::new(1).unwrap();

        let (controller, log) = build_controller(defaults(), |_| ok("")).await;
        assert!(controller.verify_input_change(port).await);
        assert_eq!(executions(&log), vec!["give_device_vendor_id"]);

        let (controller, _) = build_controller(defaults(), |_| fail()).await;
        assert!(!controller.verify_input_change(port).await);
    }
}
