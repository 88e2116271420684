use crate::Repository;
use kennel_core::{FileRecord, LinkedEntityType};

impl Repository<FileRecord> {
    pub fn get_by_entity(&self, entity_type: LinkedEntityType, entity_id: &str) -> Vec<FileRecord> {
        self.filter(|f| {
            f.entity_type == Some(entity_type) && f.entity_id.as_deref() == Some(entity_id)
        })
    }
}
