//! Scan lifecycle stages as reported by the SAST scan queue

/// Scan lifecycle stage
///
/// Codes outside the documented vocabulary are kept as [`Stage::Other`] so a
/// newer server never breaks decoding; they produce no samples.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Stage {
    New,
    PreScan,
    Queued,
    Scanning,
    /// Code 5, documented as unused
    Reserved,
    PostScan,
    Finished,
    Canceled,
    Failed,
    SourcePullingAndDeployment,
    /// Code 1001
    Unassigned,
    Other(i64),
}

impl std::fmt::Display for Stage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Stage::Other(code) => write!(f, "Other({})", code),
            named => write!(f, "{:?}", named),
        }
    }
}

impl Stage {
    pub fn from_code(code: i64) -> Self {
        match code {
            1 => Stage::New,
            2 => Stage::PreScan,
            3 => Stage::Queued,
            4 => Stage::Scanning,
            5 => Stage::Reserved,
            6 => Stage::PostScan,
            7 => Stage::Finished,
            8 => Stage::Canceled,
            9 => Stage::Failed,
            10 => Stage::SourcePullingAndDeployment,
            1001 => Stage::Unassigned,
            other => Stage::Other(other),
        }
    }

    pub fn code(self) -> i64 {
        match self {
            Stage::New => 1,
            Stage::PreScan => 2,
            Stage::Queued => 3,
            Stage::Scanning => 4,
            Stage::Reserved => 5,
            Stage::PostScan => 6,
            Stage::Finished => 7,
            Stage::Canceled => 8,
            Stage::Failed => 9,
            Stage::SourcePullingAndDeployment => 10,
            Stage::Unassigned => 1001,
            Stage::Other(code) => code,
        }
    }

    /// Stages 3 through 6: the scan holds a concurrency slot on its engine
    pub fn is_active(self) -> bool {
        (3..=6).contains(&self.code())
    }

    /// Stages 4 through 6: the engine is working on the scan
    pub fn is_scanning(self) -> bool {
        (4..=6).contains(&self.code())
    }

    /// Stages 1, 2 and 10: source is still being fetched
    pub fn is_pulling(self) -> bool {
        matches!(
            self,
            Stage::New | Stage::PreScan | Stage::SourcePullingAndDeployment
        )
    }

    /// Stages 1 through 6 and 10: the scan has not reached a terminal state
    pub fn is_in_flight(self) -> bool {
        (1..=6).contains(&self.code()) || self == Stage::SourcePullingAndDeployment
    }
}
