#[derive(Debug, Default, Clone, Copy)]
pub struct FillCounters {
    pub reads_total: u64,
    pub reads_too_short: u64,
    pub reads_low_complexity: u64,
    pub reads_accepted: u64,
    pub kmers_low_complexity: u64,
    pub kmers_routed: u64,
}

impl std::ops::AddAssign for FillCounters {
    fn add_assign(&mut self, other: Self) {
        self.reads_total += other.reads_total;
        self.reads_too_short += other.reads_too_short;
        self.reads_low_complexity += other.reads_low_complexity;
        self.reads_accepted += other.reads_accepted;
        self.kmers_low_complexity += other.kmers_low_complexity;
        self.kmers_routed += other.kmers_routed;
    }
}
