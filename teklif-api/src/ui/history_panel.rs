use pricing::HistoryRecord;

/// 可折叠的价格变动历史，默认折叠
#[derive(Debug, Clone, Default)]
pub struct HistoryPanel {
    records: Vec<HistoryRecord>,
    open: bool,
}

impl HistoryPanel {
    pub fn new(records: Vec<HistoryRecord>) -> Self {
        Self {
            records,
            open: false,
        }
    }

    pub fn toggle(&mut self) {
        self.open = !self.open;
    }

    pub fn is_open(&self) -> bool {
        self.open
    }

    pub fn records(&self) -> &[HistoryRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}
