use super::{CecCommand, CecDestination, CecInvocation, HdmiPort, PortEncoding};
use std::time::Duration;

/// What happens before the first variant is sent
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReadinessCheck {
    /// Poll the power status until the TV answers; proceed either way
    WaitForReady { max_attempts: u32 },
    /// Sleep unconditionally
    FixedDelay(Duration),
}

/// Input-switch retry policy: an ordered list of equivalent command variants
/// tried in turn, repeated for `attempts` rounds with `backoff` in between.
///
/// TV firmwares differ in which encoding they accept, so variant order is
/// fixed and the most widely accepted one goes first.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InputSwitchPlan {
    pub port: HdmiPort,
    pub variants: Vec<CecInvocation>,
    pub attempts: u32,
    pub readiness: ReadinessCheck,
    pub settle: Duration,
    pub backoff: Duration,
    pub verify: bool,
}

impl InputSwitchPlan {
    /// Four variants, `attempts` rounds, readiness wait and best-effort
    /// verification after the first accepted command.
    pub fn with_retries(
        port: HdmiPort,
        attempts: u32,
        ready_max_attempts: u32,
        settle: Duration,
        backoff: Duration,
    ) -> Self {
        let broadcast_decimal =
            CecCommand::select_input(CecDestination::Broadcast, port, PortEncoding::Decimal);

        let variants = vec![
            CecInvocation::single(broadcast_decimal),
            CecInvocation::single(CecCommand::select_input(
                CecDestination::Tv,
                port,
                PortEncoding::Decimal,
            )),
            CecInvocation::single(CecCommand::ActiveSource).then(broadcast_decimal),
            CecInvocation::single(CecCommand::select_input(
                CecDestination::Broadcast,
                port,
                PortEncoding::HexLower,
            )),
        ];

        Self {
            port,
            variants,
            attempts,
            readiness: ReadinessCheck::WaitForReady {
                max_attempts: ready_max_attempts,
            },
            settle,
            backoff,
            verify: true,
        }
    }

    /// Three variants, one pass, fixed pre-delay and no verification
    pub fn simple(port: HdmiPort, pre_delay: Duration, settle: Duration) -> Self {
        let variants = vec![
            CecInvocation::single(CecCommand::select_input(
                CecDestination::Broadcast,
                port,
                PortEncoding::Decimal,
            )),
            CecInvocation::single(CecCommand::select_input(
                CecDestination::Tv,
                port,
                PortEncoding::Decimal,
            )),
            CecInvocation::single(CecCommand::select_input(
                CecDestination::Broadcast,
                port,
                PortEncoding::HexUpper,
            )),
        ];

        Self {
            port,
            variants,
            attempts: 1,
            readiness: ReadinessCheck::FixedDelay(pre_delay),
            settle,
            backoff: Duration::ZERO,
            verify: false,
        }
    }
}
