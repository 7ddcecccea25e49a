use super::errors::TvControlError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// HDMI input port on the television (1..=4)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct HdmiPort {
    number: u8,
}

impl HdmiPort {
    pub const MIN: u8 = 1;
    pub const MAX: u8 = 4;

    pub fn new(number: i64) -> Result<Self, TvControlError> {
        if !(Self::MIN as i64..=Self::MAX as i64).contains(&number) {
            return Err(TvControlError::DeviceOutOfRange(number));
        }
        Ok(Self {
            number: number as u8,
        })
    }

    pub fn number(&self) -> u8 {
        self.number
    }

    /// Port-select byte as the TV's physical address high byte (N0)
    pub fn physical_address_byte(&self) -> u8 {
        self.number * 16
    }
}

impl fmt::Display for HdmiPort {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.number)
    }
}

impl FromStr for HdmiPort {
    type Err = TvControlError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let number = s
            .trim()
            .parse::<i64>()
            .map_err(|_| TvControlError::InvalidDeviceNumber(s.to_string()))?;
        Self::new(number)
    }
}

impl TryFrom<&str> for HdmiPort {
    type Error = TvControlError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl TryFrom<String> for HdmiPort {
    type Error = TvControlError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

macro_rules! hdmi_port_from_int {
    ($($t:ty),*) => {
        $(
            impl TryFrom<$t> for HdmiPort {
                type Error = TvControlError;

                fn try_from(value: $t) -> Result<Self, Self::Error> {
                    let number = i64::try_from(value)
                        .map_err(|_| TvControlError::InvalidDeviceNumber(value.to_string()))?;
                    Self::new(number)
                }
            }
        )*
    };
}

hdmi_port_from_int!(u8, u16, u32, u64, usize, i8, i16, i32, i64);

/// Destination half of the `tx` header byte. The initiator is always
/// logical address 1 (recording device 1).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CecDestination {
    /// 0x1f
    Broadcast,
    /// 0x10
    Tv,
}

impl CecDestination {
    pub fn header_byte(&self) -> u8 {
        match self {
            CecDestination::Broadcast => 0x1f,
            CecDestination::Tv => 0x10,
        }
    }
}

/// How the port-select byte of an input-select frame is written
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PortEncoding {
    /// `N0`, the port digit followed by a literal zero
    Decimal,
    /// `{N*16:02x}`
    HexLower,
    /// `{N*16:02X}`, header byte uppercased too
    HexUpper,
}

const ACTIVE_SOURCE_OPCODE: u8 = 0x82;

/// One line understood by `cec-client` on stdin
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CecCommand {
    PowerStatus,
    PowerOn,
    Standby,
    ActiveSource,
    GiveDeviceVendorId,
    SelectInput {
        destination: CecDestination,
        port: HdmiPort,
        encoding: PortEncoding,
    },
}

impl CecCommand {
    pub fn select_input(
        destination: CecDestination,
        port: HdmiPort,
        encoding: PortEncoding,
    ) -> Self {
        CecCommand::SelectInput {
            destination,
            port,
            encoding,
        }
    }

    pub fn render(&self) -> String {
        match self {
            CecCommand::PowerStatus => "pow 0".to_string(),
            CecCommand::PowerOn => "on 0".to_string(),
            CecCommand::Standby => "standby 0".to_string(),
            CecCommand::ActiveSource => "as".to_string(),
            CecCommand::GiveDeviceVendorId => "give_device_vendor_id".to_string(),
            CecCommand::SelectInput {
                destination,
                port,
                encoding,
            } => {
                let header = destination.header_byte();
                match encoding {
                    PortEncoding::Decimal => format!(
                        "tx {:02x}:{:02x}:{}0:00",
                        header, ACTIVE_SOURCE_OPCODE, port.number()
                    ),
                    PortEncoding::HexLower => format!(
                        "tx {:02x}:{:02x}:{:02x}:00",
                        header,
                        ACTIVE_SOURCE_OPCODE,
                        port.physical_address_byte()
                    ),
                    PortEncoding::HexUpper => format!(
                        "tx {:02X}:{:02X}:{:02X}:00",
                        header,
                        ACTIVE_SOURCE_OPCODE,
                        port.physical_address_byte()
                    ),
                }
            }
        }
    }
}

impl fmt::Display for CecCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.render())
    }
}

/// Commands run back to back, one client process each, stopping at the
/// first failure. Always holds at least one command.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CecInvocation {
    commands: Vec<CecCommand>,
}

impl CecInvocation {
    pub fn single(command: CecCommand) -> Self {
        Self {
            commands: vec![command],
        }
    }

    pub fn then(mut self, command: CecCommand) -> Self {
        self.commands.push(command);
        self
    }

    pub fn commands(&self) -> &[CecCommand] {
        &self.commands
    }

    /// Shell-equivalent rendering, used for log lines
    pub fn to_shell_line(&self, program: &str, args: &[String]) -> String {
        let client = std::iter::once(program)
            .chain(args.iter().map(String::as_str))
            .collect::<Vec<_>>()
            .join(" ");
        self.commands
            .iter()
            .map(|command| format!("echo \"{}\" | {}", command, client))
            .collect::<Vec<_>>()
            .join(" && ")
    }
}

impl From<CecCommand> for CecInvocation {
    fn from(command: CecCommand) -> Self {
        Self::single(command)
    }
}

impl fmt::Display for CecInvocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let lines: Vec<String> = self.commands.iter().map(CecCommand::render).collect();
        write!(f, "{}", lines.join(" && "))
    }
}

pub const TIMEOUT_INDICATOR: &str = "Command timed out";

/// Outcome of one invocation. `success` is true only when every client
/// process exited with status zero.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExecutionResult {
    pub success: bool,
    pub output: String,
}

impl ExecutionResult {
    pub fn succeeded(output: impl Into<String>) -> Self {
        Self {
            success: true,
            output: output.into(),
        }
    }

    pub fn failed(output: impl Into<String>) -> Self {
        Self {
            success: false,
            output: output.into(),
        }
    }

    pub fn timed_out() -> Self {
        Self::failed(TIMEOUT_INDICATOR)
    }

    pub fn is_timeout(&self) -> bool {
        !self.success && self.output == TIMEOUT_INDICATOR
    }
}

impl From<Result<String, TvControlError>> for ExecutionResult {
    fn from(result: Result<String, TvControlError>) -> Self {
        match result {
            Ok(stdout) => Self::succeeded(stdout),
            Err(TvControlError::Timeout(_)) => Self::timed_out(),
            Err(TvControlError::CommandFailed { stderr, .. }) => Self::failed(stderr),
            Err(e) => Self::failed(e.to_string()),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PowerStatus {
    On,
    Standby,
}

impl PowerStatus {
    /// Scans free-form client output, case-insensitively
    pub fn parse(output: &str) -> Option<Self> {
        let lower = output.to_lowercase();
        if lower.contains("power status: on") {
            Some(PowerStatus::On)
        } else if lower.contains("power status: standby") {
            Some(PowerStatus::Standby)
        } else {
            None
        }
    }

    pub fn is_on(&self) -> bool {
        matches!(self, PowerStatus::On)
    }
}

impl fmt::Display for PowerStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PowerStatus::On => write!(f, "on"),
            PowerStatus::Standby => write!(f, "standby"),
        }
    }
}

/// Identifier of a CEC adapter that answered startup detection
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct AdapterId(pub u8);

impl fmt::Display for AdapterId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "adapter {}", self.0)
    }
}
