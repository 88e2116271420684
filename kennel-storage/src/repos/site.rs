//! Public-site collections: testimonials, gallery, FAQ.

use crate::Repository;
use kennel_core::{CustomerId, FaqItem, GalleryItem, KennelResult, Testimonial};
use std::ops::Deref;

impl Repository<Testimonial> {
    pub fn get_public(&self) -> Vec<Testimonial> {
        self.filter(|t| t.is_public)
    }

    pub fn get_featured(&self) -> Vec<Testimonial> {
        self.filter(|t| t.is_featured)
    }
}

/// Testimonial repository that keeps featured testimonials public.
#[derive(Debug, Clone)]
pub struct TestimonialRepository {
    testimonials: Repository<Testimonial>,
}

impl Deref for TestimonialRepository {
    type Target = Repository<Testimonial>;

    fn deref(&self) -> &Self::Target {
        &self.testimonials
    }
}

impl TestimonialRepository {
    pub fn new(testimonials: Repository<Testimonial>) -> Self {
        Self { testimonials }
    }

    /// Save a testimonial. A featured testimonial is always stored public.
    pub async fn save(&self, testimonial: &Testimonial) -> KennelResult<Testimonial> {
        if testimonial.is_featured && !testimonial.is_public {
            let public = Testimonial {
                is_public: true,
                ..testimonial.clone()
            };
            return self.testimonials.save(&public).await;
        }
        self.testimonials.save(testimonial).await
    }
}

impl Repository<GalleryItem> {
    pub fn get_public(&self) -> Vec<GalleryItem> {
        self.filter(|g| g.is_public)
    }

    pub fn get_by_customer(&self, customer_id: &CustomerId) -> Vec<GalleryItem> {
        self.filter(|g| g.customer_id.as_ref() == Some(customer_id))
    }
}

impl Repository<FaqItem> {
    pub fn get_public(&self) -> Vec<FaqItem> {
        self.filter(|f| f.is_public)
    }

    pub fn get_by_category(&self, category: &str) -> Vec<FaqItem> {
        self.filter(|f| {
            f.category
                .as_deref()
                .is_some_and(|c| c.eq_ignore_ascii_case(category))
        })
    }
}
