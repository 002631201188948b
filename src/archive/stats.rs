use crate::filter::Stage;

/// Counters for one archive run.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct RunStats {
    /// Records read from the container, of any type.
    pub scanned: u64,
    /// Records skipped because they are not `response` records.
    pub non_response: u64,
    pub rejected_host: u64,
    pub rejected_date: u64,
    pub rejected_language: u64,
    pub accepted: u64,
    /// Records that failed to parse.
    pub errors: u64,
}

impl RunStats {
    pub fn record_rejection(&mut self, stage: Stage) {
        match stage {
            Stage::Host => self.rejected_host += 1,
            Stage::Date => self.rejected_date += 1,
            Stage::Language => self.rejected_language += 1,
        }
    }

    pub fn rejected(&self) -> u64 {
        self.rejected_host + self.rejected_date + self.rejected_language
    }

    /// Add another run's counters, e.g. to total several containers.
    pub fn merge(&mut self, other: &RunStats) {
        self.scanned += other.scanned;
        self.non_response += other.non_response;
        self.rejected_host += other.rejected_host;
        self.rejected_date += other.rejected_date;
        self.rejected_language += other.rejected_language;
        self.accepted += other.accepted;
        self.errors += other.errors;
    }
}
