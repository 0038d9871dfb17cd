use crate::{
    entities::{
        inbound_record,
        supplier::{self, Entity as Supplier, PaymentMethod, SupplierStatus},
    },
    errors::ServiceError,
    events::{Event, EventSender},
    services::{optional_text, required_text, Page, PageRequest},
};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, DatabaseConnection, EntityTrait, PaginatorTrait,
    QueryFilter, QueryOrder, QuerySelect, Set,
};
use std::sync::Arc;
use tracing::{info, instrument};
use uuid::Uuid;

const MAX_PHONE_LEN: usize = 32;

#[derive(Debug, Clone, Default)]
pub struct CreateSupplierInput {
    pub name: String,
    pub contact: Option<String>,
    pub phone: Option<String>,
    pub address: Option<String>,
    pub payment_method: Option<PaymentMethod>,
    pub status: Option<SupplierStatus>,
    pub notes: Option<String>,
}

#[derive(Debug, Clone, Default)]
pub struct UpdateSupplierInput {
    pub name: Option<String>,
    pub contact: Option<String>,
    pub phone: Option<String>,
    pub address: Option<String>,
    pub payment_method: Option<PaymentMethod>,
    pub status: Option<SupplierStatus>,
    pub notes: Option<String>,
}

#[derive(Debug, Clone, Default)]
pub struct SupplierFilter {
    /// Substring of name, contact or phone
    pub search: Option<String>,
    pub status: Option<SupplierStatus>,
}

#[derive(Clone)]
pub struct SupplierService {
    db: Arc<DatabaseConnection>,
    event_sender: Arc<EventSender>,
}

impl SupplierService {
    pub fn new(db: Arc<DatabaseConnection>, event_sender: Arc<EventSender>) -> Self {
        Self { db, event_sender }
    }

    #[instrument(skip(self))]
    pub async fn create_supplier(
        &self,
        input: CreateSupplierInput,
    ) -> Result<supplier::Model, ServiceError> {
        let name = required_text("name", &input.name)?;
        let phone = optional_text(input.phone);
        ensure_phone(phone.as_deref())?;
        self.ensure_unique_name(&name, None).await?;

        let duplicate = format!("Supplier {} already exists", name);
        let supplier_id = Uuid::new_v4();
        let model = supplier::ActiveModel {
            id: Set(supplier_id),
            name: Set(name),
            contact: Set(optional_text(input.contact)),
            phone: Set(phone),
            address: Set(optional_text(input.address)),
            payment_method: Set(input.payment_method.unwrap_or_default()),
            status: Set(input.status.unwrap_or_default()),
            notes: Set(optional_text(input.notes)),
            ..Default::default()
        };
        let supplier = model
            .insert(&*self.db)
            .await
            .map_err(|e| ServiceError::from_unique_violation(e, || duplicate))?;

        self.event_sender
            .send_or_log(Event::SupplierCreated(supplier_id))
            .await;

        info!("Created supplier: {}", supplier_id);
        Ok(supplier)
    }

    #[instrument(skip(self))]
    pub async fn get_supplier(&self, supplier_id: Uuid) -> Result<supplier::Model, ServiceError> {
        Supplier::find_by_id(supplier_id)
            .one(&*self.db)
            .await?
            .ok_or_else(|| ServiceError::not_found("Supplier", supplier_id))
    }

    /// List suppliers by name
    #[instrument(skip(self))]
    pub async fn list_suppliers(
        &self,
        filter: SupplierFilter,
        page: PageRequest,
    ) -> Result<Page<supplier::Model>, ServiceError> {
        let mut query = Supplier::find();

        if let Some(search) = optional_text(filter.search) {
            query = query.filter(
                Condition::any()
                    .add(supplier::Column::Name.contains(&search))
                    .add(supplier::Column::Contact.contains(&search))
                    .add(supplier::Column::Phone.contains(&search)),
            );
        }
        if let Some(status) = filter.status {
            query = query.filter(supplier::Column::Status.eq(status));
        }

        let total = query.clone().count(&*self.db).await?;
        let items = query
            .order_by_asc(supplier::Column::Name)
            .limit(page.page_size)
            .offset(page.offset())
            .all(&*self.db)
            .await?;

        Ok(Page {
            items,
            total,
            request: page,
        })
    }

    #[instrument(skip(self))]
    pub async fn update_supplier(
        &self,
        supplier_id: Uuid,
        input: UpdateSupplierInput,
    ) -> Result<supplier::Model, ServiceError> {
        let existing = self.get_supplier(supplier_id).await?;

        let name = input
            .name
            .as_deref()
            .map(|v| required_text("name", v))
            .transpose()?;
        if let Some(ref name) = name {
            if *name != existing.name {
                self.ensure_unique_name(name, Some(supplier_id)).await?;
            }
        }

        let duplicate = format!(
            "Supplier {} already exists",
            name.as_deref().unwrap_or(&existing.name)
        );
        let mut active: supplier::ActiveModel = existing.into();
        if let Some(name) = name {
            active.name = Set(name);
        }
        if input.contact.is_some() {
            active.contact = Set(optional_text(input.contact));
        }
        if input.phone.is_some() {
            let phone = optional_text(input.phone);
            ensure_phone(phone.as_deref())?;
            active.phone = Set(phone);
        }
        if input.address.is_some() {
            active.address = Set(optional_text(input.address));
        }
        if let Some(method) = input.payment_method {
            active.payment_method = Set(method);
        }
        if let Some(status) = input.status {
            active.status = Set(status);
        }
        if input.notes.is_some() {
            active.notes = Set(optional_text(input.notes));
        }

        let supplier = active
            .update(&*self.db)
            .await
            .map_err(|e| ServiceError::from_unique_violation(e, || duplicate))?;

        self.event_sender
            .send_or_log(Event::SupplierUpdated(supplier_id))
            .await;

        info!("Updated supplier: {}", supplier_id);
        Ok(supplier)
    }

    /// Delete a supplier no inbound record refers to
    #[instrument(skip(self))]
    pub async fn delete_supplier(&self, supplier_id: Uuid) -> Result<(), ServiceError> {
        let supplier = self.get_supplier(supplier_id).await?;

        let references = inbound_record::Entity::find()
            .filter(inbound_record::Column::SupplierId.eq(supplier_id))
            .count(&*self.db)
            .await?;
        if references > 0 {
            return Err(ServiceError::Conflict(format!(
                "Supplier {} is referenced by {} inbound records",
                supplier_id, references
            )));
        }

        let active: supplier::ActiveModel = supplier.into();
        active.delete(&*self.db).await?;

        self.event_sender
            .send_or_log(Event::SupplierDeleted(supplier_id))
            .await;

        info!("Deleted supplier {}", supplier_id);
        Ok(())
    }

    async fn ensure_unique_name(
        &self,
        name: &str,
        exclude_id: Option<Uuid>,
    ) -> Result<(), ServiceError> {
        let mut query = Supplier::find().filter(supplier::Column::Name.eq(name));
        if let Some(id) = exclude_id {
            query = query.filter(supplier::Column::Id.ne(id));
        }

        if query.one(&*self.db).await?.is_some() {
            return Err(ServiceError::Duplicate(format!(
                "Supplier {} already exists",
                name
            )));
        }

        Ok(())
    }
}

fn ensure_phone(phone: Option<&str>) -> Result<(), ServiceError> {
    match phone {
        Some(phone) if phone.chars().count() > MAX_PHONE_LEN => Err(ServiceError::ValidationError(
            format!("phone must be at most {} characters", MAX_PHONE_LEN),
        )),
        _ => Ok(()),
    }
}
