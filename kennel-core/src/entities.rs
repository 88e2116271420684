//! Core entity structures
//!
//! Each entity is declared with its store column table. Column names are the
//! fixed schema names persisted data already uses and must not change.

use crate::{
    Amount, CustomerId, DogId, DogLocation, ExpenseId, FaqItemId, FileId, GalleryItemId, Gender,
    LinkedEntityType, LitterId, LitterStatus, PurchaseId, PuppyId, PuppyStatus, ReminderId,
    SettingsId, TestimonialId, Timestamp, VetRecordId, VetRecordType, WaitlistEntryId,
    WaitlistStatus,
};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Free-form site content document, keyed by page area.
pub type SiteContent = serde_json::Map<String, serde_json::Value>;

// ============================================================================
// SUB-RECORDS
// ============================================================================

/// Family hosting a guardian dog.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct GuardianFamily {
    pub name: String,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub address: Option<String>,
    pub agreement_date: Option<NaiveDate>,
    pub notes: Option<String>,
}

/// One move of a waitlist deposit from one litter to another.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct DepositTransfer {
    pub from_litter: Option<LitterId>,
    pub to_litter: Option<LitterId>,
    pub date: Option<NaiveDate>,
    pub notes: Option<String>,
}

/// Social profile links shown on the public site.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct SocialLinks {
    pub facebook: Option<String>,
    pub instagram: Option<String>,
    pub tiktok: Option<String>,
    pub youtube: Option<String>,
}

// ============================================================================
// DOGS, LITTERS, PUPPIES
// ============================================================================

entity_schema! {
    /// A dog owned by the program, kept at home or with a guardian family.
    pub struct Dog {
        id: DogId,
        collection: Dogs,
        fields {
            name: String => "name",
            breed: String => "breed",
            gender: Option<Gender> => "gender",
            birthday: Option<NaiveDate> => "birthday",
            color: String => "color",
            weight: Option<f64> => "weight",
            registration_number: Option<String> => "registration_number",
            microchip_number: Option<String> => "microchip",
            photos: Vec<String> => "photos",
            description: Option<String> => "description",
            is_breeding: bool => "is_breeding",
            is_public: bool => "is_public",
            location: DogLocation => "location",
            last_heat_date: Option<NaiveDate> => "last_heat_date",
            /// Days between heats; `None` means the program default.
            heat_cycle_length: Option<u32> => "heat_cycle_days",
            guardian_family: Option<GuardianFamily> => "guardian_family",
            notes: Option<String> => "notes",
        }
    }
}

impl Dog {
    pub fn is_female(&self) -> bool {
        self.gender == Some(Gender::Female)
    }

    pub fn is_home(&self) -> bool {
        self.location == DogLocation::Home
    }
}

entity_schema! {
    /// A planned or whelped litter.
    pub struct Litter {
        id: LitterId,
        collection: Litters,
        fields {
            name: String => "name",
            mother_id: Option<DogId> => "mother_id",
            father_id: Option<DogId> => "father_id",
            breed: String => "breed",
            expected_date: Option<NaiveDate> => "expected_date",
            birth_date: Option<NaiveDate> => "birth_date",
            puppy_count: Option<u32> => "puppy_count",
            status: LitterStatus => "status",
            is_public: bool => "is_public",
            description: Option<String> => "description",
            notes: Option<String> => "notes",
        }
        references {
            mother_id => Dogs,
            father_id => Dogs,
        }
    }
}

entity_schema! {
    /// A puppy from one of the program's litters.
    ///
    /// `status` and `customer_id` move together: a purchase marks the puppy
    /// sold to its customer, deleting the purchase makes it available again.
    pub struct Puppy {
        id: PuppyId,
        collection: Puppies,
        fields {
            name: String => "name",
            litter_id: Option<LitterId> => "litter_id",
            gender: Option<Gender> => "gender",
            color: String => "color",
            weight: Option<f64> => "weight",
            birthday: Option<NaiveDate> => "birthday",
            status: PuppyStatus => "status",
            price: Amount => "price",
            customer_id: Option<CustomerId> => "customer_id",
            is_public: bool => "is_public",
            photos: Vec<String> => "photos",
            personality: Option<String> => "personality",
            description: Option<String> => "description",
            notes: Option<String> => "notes",
        }
        references {
            litter_id => Litters,
            customer_id => Customers,
        }
    }
}

// ============================================================================
// CUSTOMERS & MONEY
// ============================================================================

entity_schema! {
    /// A buyer, guardian family or prospect.
    pub struct Customer {
        id: CustomerId,
        collection: Customers,
        fields {
            name: String => "name",
            email: Option<String> => "email",
            phone: Option<String> => "phone",
            address: Option<String> => "address",
            city: Option<String> => "city",
            state: Option<String> => "state",
            zip: Option<String> => "zip",
            is_guardian: bool => "is_guardian",
            show_on_website: bool => "show_on_website",
            photo: Option<String> => "photo",
            notes: Option<String> => "notes",
        }
    }
}

entity_schema! {
    /// Sale of a puppy to a customer. At most one purchase per puppy.
    pub struct Purchase {
        id: PurchaseId,
        collection: Purchases,
        fields {
            customer_id: Option<CustomerId> => "customer_id",
            puppy_id: Option<PuppyId> => "puppy_id",
            amount: Amount => "amount",
            deposit_amount: Amount => "deposit_amount",
            purchase_date: Option<NaiveDate> => "purchase_date",
            payment_method: Option<String> => "payment_method",
            payment_status: Option<String> => "payment_status",
            notes: Option<String> => "notes",
        }
        references {
            customer_id => Customers,
            puppy_id => Puppies,
        }
    }
}

entity_schema! {
    /// A business expense, optionally tied to a dog.
    pub struct Expense {
        id: ExpenseId,
        collection: Expenses,
        fields {
            category: String => "category",
            description: String => "description",
            amount: Amount => "amount",
            date: Option<NaiveDate> => "date",
            dog_id: Option<DogId> => "dog_id",
            vendor: Option<String> => "vendor",
            receipt_url: Option<String> => "receipt",
            notes: Option<String> => "notes",
        }
        references {
            dog_id => Dogs,
        }
    }
}

// ============================================================================
// HEALTH
// ============================================================================

entity_schema! {
    /// A veterinary visit or shot.
    pub struct VetRecord {
        id: VetRecordId,
        collection: VetRecords,
        fields {
            dog_id: Option<DogId> => "dog_id",
            record_type: VetRecordType => "type",
            visit_date: Option<NaiveDate> => "visit_date",
            description: Option<String> => "description",
            vet_name: Option<String> => "vet_name",
            cost: Amount => "cost",
            expiration_date: Option<NaiveDate> => "expiration_date",
            document_url: Option<String> => "document",
            notes: Option<String> => "notes",
        }
        references {
            dog_id => Dogs,
        }
    }
}

// ============================================================================
// WAITLIST
// ============================================================================

entity_schema! {
    /// A family waiting for a puppy. Litter, puppy and customer references
    /// are loose and not checked on save.
    pub struct WaitlistEntry {
        id: WaitlistEntryId,
        collection: Waitlist,
        fields {
            first_name: String => "first_name",
            last_name: String => "last_name",
            email: Option<String> => "email",
            phone: Option<String> => "phone",
            status: WaitlistStatus => "status",
            breed_preference: Option<String> => "breed_preference",
            gender_preference: Option<Gender> => "gender_preference",
            color_preference: Option<String> => "color_preference",
            parent_preference: Option<String> => "parent_preference",
            assigned_litter_id: Option<LitterId> => "assigned_litter_id",
            deposit_paid: bool => "deposit_paid",
            deposit_amount: Amount => "deposit_amount",
            deposit_method: Option<String> => "deposit_method",
            deposit_date: Option<NaiveDate> => "deposit_date",
            deposit_transfers: Vec<DepositTransfer> => "deposit_history",
            fulfilled_date: Option<NaiveDate> => "fulfilled_date",
            cancelled_date: Option<NaiveDate> => "cancelled_date",
            cancellation_reason: Option<String> => "cancellation_reason",
            puppy_id: Option<PuppyId> => "puppy_id",
            customer_id: Option<CustomerId> => "customer_id",
            notes: Option<String> => "notes",
        }
    }
}

impl WaitlistEntry {
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
            .trim()
            .to_string()
    }

    /// Whether the entry holds a place in the queue: active, or pending
    /// with the deposit paid.
    pub fn holds_queue_place(&self) -> bool {
        match self.status {
            WaitlistStatus::Active => true,
            WaitlistStatus::Pending => self.deposit_paid,
            WaitlistStatus::Fulfilled | WaitlistStatus::Cancelled => false,
        }
    }
}

// ============================================================================
// REMINDERS & FILES
// ============================================================================

entity_schema! {
    /// A dated to-do, optionally attached to any entity.
    pub struct Reminder {
        id: ReminderId,
        collection: Reminders,
        fields {
            title: String => "title",
            description: Option<String> => "description",
            date: Option<NaiveDate> => "date",
            reminder_type: Option<String> => "type",
            entity_type: Option<LinkedEntityType> => "entity_type",
            entity_id: Option<String> => "entity_id",
            completed: bool => "completed",
            completed_at: Option<Timestamp> => "completed_at",
        }
    }
}

entity_schema! {
    /// Metadata of an uploaded file attached to any entity.
    pub struct FileRecord {
        id: FileId,
        collection: Files,
        fields {
            entity_type: Option<LinkedEntityType> => "entity_type",
            entity_id: Option<String> => "entity_id",
            file_name: String => "file_name",
            file_url: String => "file_url",
            file_type: Option<String> => "file_type",
            file_size: Option<u64> => "file_size",
            notes: Option<String> => "notes",
        }
    }
}

// ============================================================================
// PUBLIC SITE
// ============================================================================

entity_schema! {
    /// A customer testimonial. Featured testimonials are always public.
    pub struct Testimonial {
        id: TestimonialId,
        collection: Testimonials,
        fields {
            customer_id: Option<CustomerId> => "customer_id",
            puppy_id: Option<PuppyId> => "puppy_id",
            author_name: String => "author_name",
            puppy_name: Option<String> => "puppy_name",
            content: String => "content",
            rating: Option<u8> => "rating",
            is_public: bool => "is_public",
            is_featured: bool => "is_featured",
            display_order: i32 => "display_order",
            photo: Option<String> => "photo",
        }
    }
}

entity_schema! {
    /// A photo in the public gallery.
    pub struct GalleryItem {
        id: GalleryItemId,
        collection: Gallery,
        fields {
            customer_id: Option<CustomerId> => "customer_id",
            puppy_id: Option<PuppyId> => "puppy_id",
            title: String => "title",
            description: Option<String> => "description",
            image_url: String => "image_url",
            is_public: bool => "is_public",
            display_order: i32 => "display_order",
        }
    }
}

entity_schema! {
    pub struct FaqItem {
        id: FaqItemId,
        collection: Faq,
        fields {
            question: String => "question",
            answer: String => "answer",
            category: Option<String> => "category",
            display_order: i32 => "display_order",
            is_public: bool => "is_public",
        }
    }
}

entity_schema! {
    /// Singleton business settings and site content.
    pub struct Settings {
        id: SettingsId,
        collection: Settings,
        fields {
            business_name: String => "business_name",
            owner_name: Option<String> => "owner_name",
            email: Option<String> => "email",
            phone: Option<String> => "phone",
            address: Option<String> => "address",
            website: Option<String> => "website",
            social_links: SocialLinks => "social_links",
            site_content: SiteContent => "site_content",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Collection, Row, StoreRecord};
    use serde_json::json;

    fn sample_dog() -> Dog {
        Dog {
            name: "Juniper".to_string(),
            breed: "Bernedoodle".to_string(),
            gender: Some(Gender::Female),
            birthday: NaiveDate::from_ymd_opt(2021, 4, 12),
            heat_cycle_length: Some(170),
            microchip_number: Some("985112004".to_string()),
            location: DogLocation::Guardian,
            guardian_family: Some(GuardianFamily {
                name: "The Okafors".to_string(),
                ..Default::default()
            }),
            ..Default::default()
        }
    }

    #[test]
    fn test_field_map_is_exhaustive_and_unique() {
        let fields = Dog::FIELD_MAP;
        // id + 17 declared fields + two timestamps
        assert_eq!(fields.len(), 20);

        let mut columns: Vec<&str> = fields.iter().map(|m| m.column).collect();
        columns.sort_unstable();
        columns.dedup();
        assert_eq!(columns.len(), fields.len());
    }

    #[test]
    fn test_renamed_columns() {
        assert_eq!(Dog::column_for("heat_cycle_length"), Some("heat_cycle_days"));
        assert_eq!(Dog::column_for("microchip_number"), Some("microchip"));
        assert_eq!(VetRecord::column_for("record_type"), Some("type"));
        assert_eq!(
            WaitlistEntry::column_for("deposit_transfers"),
            Some("deposit_history")
        );
        assert_eq!(Dog::column_for("favorite_toy"), None);
    }

    #[test]
    fn test_to_row_uses_schema_columns() {
        let row = sample_dog().to_row().unwrap();
        assert_eq!(row.get("heat_cycle_days"), Some(&json!(170)));
        assert_eq!(row.get("microchip"), Some(&json!("985112004")));
        assert_eq!(row.get("location"), Some(&json!("guardian")));
        assert_eq!(row.get("birthday"), Some(&json!("2021-04-12")));
        assert!(row.get("heatCycleLength").is_none());
        // Store-managed columns are never written by the client.
        assert!(row.get("id").is_none());
        assert!(row.get("created_at").is_none());
    }

    #[test]
    fn test_row_decodes_back_to_same_entity() {
        let dog = sample_dog();
        let mut row = dog.to_row().unwrap();
        row.insert("id".to_string(), json!("d-1"));

        let decoded = Dog::from_row(&row).unwrap();
        assert_eq!(decoded.id, Some(DogId::new("d-1")));
        assert_eq!(Dog { id: None, ..decoded }, dog);
    }

    #[test]
    fn test_domain_json_drops_unknown_keys() {
        let dog: Dog = serde_json::from_value(json!({
            "name": "Maple",
            "heatCycleLength": 160,
            "favoriteToy": "rope",
        }))
        .unwrap();
        assert_eq!(dog.heat_cycle_length, Some(160));

        let row = dog.to_row().unwrap();
        assert!(row.keys().all(|k| k != "favoriteToy" && k != "favorite_toy"));
    }

    #[test]
    fn test_references_only_for_set_ids() {
        let litter = Litter {
            mother_id: Some(DogId::new("m")),
            ..Default::default()
        };
        let refs = litter.references();
        assert_eq!(refs.len(), 1);
        assert_eq!(refs[0].field, "mother_id");
        assert_eq!(refs[0].collection, Collection::Dogs);

        assert!(WaitlistEntry {
            assigned_litter_id: Some(LitterId::new("l")),
            ..Default::default()
        }
        .references()
        .is_empty());
    }

    #[test]
    fn test_non_numeric_amount_reads_as_zero() {
        let mut row = Row::new();
        row.insert("category".to_string(), json!("food"));
        row.insert("amount".to_string(), json!("TBD"));

        let expense = Expense::from_row(&row).unwrap();
        assert_eq!(expense.amount, Amount::ZERO);
    }

    #[test]
    fn test_queue_place() {
        let mut entry = WaitlistEntry::default();
        assert!(!entry.holds_queue_place());
        entry.deposit_paid = true;
        assert!(entry.holds_queue_place());
        entry.status = WaitlistStatus::Cancelled;
        assert!(!entry.holds_queue_place());
        entry.status = WaitlistStatus::Active;
        entry.deposit_paid = false;
        assert!(entry.holds_queue_place());
    }
}
