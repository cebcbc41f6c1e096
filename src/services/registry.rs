use crate::{
    db::DbPool,
    entities::{category, location, sub_category, sub_location},
    errors::ServiceError,
    events::{Event, EventSender, RegistryKind},
    serial_number::validate_code,
};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, EntityTrait, QueryFilter, QueryOrder, Set,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{info, instrument};
use utoipa::ToSchema;
use validator::Validate;

/// Width of the registry `name` columns.
pub const MAX_NAME_LEN: usize = 50;

/// Name and code for a location or category.
#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
pub struct CreateCodeRequest {
    #[validate(length(min = 1, max = 50, message = "Name must be between 1 and 50 characters"))]
    pub name: String,
    #[validate(custom = "validate_code")]
    pub code: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
pub struct CreateSubLocationRequest {
    #[validate(length(min = 1, max = 50, message = "Name must be between 1 and 50 characters"))]
    pub name: String,
    #[validate(custom = "validate_code")]
    pub code: String,
    pub location_id: i32,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
pub struct CreateSubCategoryRequest {
    #[validate(length(min = 1, max = 50, message = "Name must be between 1 and 50 characters"))]
    pub name: String,
    #[validate(custom = "validate_code")]
    pub code: String,
    pub category_id: i32,
}

/// Locations, sublocations, categories and subcategories.
#[derive(Clone)]
pub struct RegistryService {
    db_pool: Arc<DbPool>,
    event_sender: Arc<EventSender>,
}

impl RegistryService {
    pub fn new(db_pool: Arc<DbPool>, event_sender: Arc<EventSender>) -> Self {
        Self {
            db_pool,
            event_sender,
        }
    }

    #[instrument(skip(self, request), fields(code = %request.code))]
    pub async fn create_location(
        &self,
        request: CreateCodeRequest,
    ) -> Result<location::Model, ServiceError> {
        request.validate()?;
        let db = self.db_pool.as_ref();

        if find_location_by_code(db, &request.code).await?.is_some() {
            return Err(ServiceError::Conflict(format!(
                "Location code {} already exists",
                request.code
            )));
        }
        if find_location_by_name(db, &request.name).await?.is_some() {
            return Err(ServiceError::Conflict(format!(
                "Location name {} already exists",
                request.name
            )));
        }

        let model = location::ActiveModel {
            name: Set(request.name),
            code: Set(request.code),
            ..Default::default()
        }
        .insert(db)
        .await?;

        self.announce(RegistryKind::Location, model.id, &model.code).await;
        Ok(model)
    }

    #[instrument(skip(self))]
    pub async fn get_location(&self, id: i32) -> Result<location::Model, ServiceError> {
        location::Entity::find_by_id(id)
            .one(self.db_pool.as_ref())
            .await?
            .ok_or_else(|| ServiceError::NotFound(format!("Location {} not found", id)))
    }

    #[instrument(skip(self))]
    pub async fn list_locations(&self) -> Result<Vec<location::Model>, ServiceError> {
        Ok(location::Entity::find()
            .order_by_asc(location::Column::Code)
            .all(self.db_pool.as_ref())
            .await?)
    }

    #[instrument(skip(self, request), fields(code = %request.code, location_id = request.location_id))]
    pub async fn create_sublocation(
        &self,
        request: CreateSubLocationRequest,
    ) -> Result<sub_location::Model, ServiceError> {
        request.validate()?;
        let db = self.db_pool.as_ref();
        let parent = self.get_location(request.location_id).await?;

        if find_sublocation_by_code(db, parent.id, &request.code)
            .await?
            .is_some()
        {
            return Err(ServiceError::Conflict(format!(
                "Sublocation code {} already exists in location {}",
                request.code, parent.code
            )));
        }

        let model = sub_location::ActiveModel {
            name: Set(request.name),
            code: Set(request.code),
            location_id: Set(parent.id),
            ..Default::default()
        }
        .insert(db)
        .await?;

        self.announce(RegistryKind::SubLocation, model.id, &model.code).await;
        Ok(model)
    }

    #[instrument(skip(self))]
    pub async fn list_sublocations(
        &self,
        location_id: Option<i32>,
    ) -> Result<Vec<sub_location::Model>, ServiceError> {
        let mut query = sub_location::Entity::find();
        if let Some(id) = location_id {
            query = query.filter(sub_location::Column::LocationId.eq(id));
        }
        Ok(query
            .order_by_asc(sub_location::Column::LocationId)
            .order_by_asc(sub_location::Column::Code)
            .all(self.db_pool.as_ref())
            .await?)
    }

    #[instrument(skip(self, request), fields(code = %request.code))]
    pub async fn create_category(
        &self,
        request: CreateCodeRequest,
    ) -> Result<category::Model, ServiceError> {
        request.validate()?;
        let db = self.db_pool.as_ref();

        if find_category_by_code(db, &request.code).await?.is_some() {
            return Err(ServiceError::Conflict(format!(
                "Category code {} already exists",
                request.code
            )));
        }
        if find_category_by_name(db, &request.name).await?.is_some() {
            return Err(ServiceError::Conflict(format!(
                "Category name {} already exists",
                request.name
            )));
        }

        let model = category::ActiveModel {
            name: Set(request.name),
            code: Set(request.code),
            ..Default::default()
        }
        .insert(db)
        .await?;

        self.announce(RegistryKind::Category, model.id, &model.code).await;
        Ok(model)
    }

    #[instrument(skip(self))]
    pub async fn get_category(&self, id: i32) -> Result<category::Model, ServiceError> {
        category::Entity::find_by_id(id)
            .one(self.db_pool.as_ref())
            .await?
            .ok_or_else(|| ServiceError::NotFound(format!("Category {} not found", id)))
    }

    #[instrument(skip(self))]
    pub async fn list_categories(&self) -> Result<Vec<category::Model>, ServiceError> {
        Ok(category::Entity::find()
            .order_by_asc(category::Column::Code)
            .all(self.db_pool.as_ref())
            .await?)
    }

    #[instrument(skip(self, request), fields(code = %request.code, category_id = request.category_id))]
    pub async fn create_subcategory(
        &self,
        request: CreateSubCategoryRequest,
    ) -> Result<sub_category::Model, ServiceError> {
        request.validate()?;
        let db = self.db_pool.as_ref();
        let parent = self.get_category(request.category_id).await?;

        if find_subcategory_by_code(db, parent.id, &request.code)
            .await?
            .is_some()
        {
            return Err(ServiceError::Conflict(format!(
                "Subcategory code {} already exists in category {}",
                request.code, parent.code
            )));
        }

        let model = sub_category::ActiveModel {
            name: Set(request.name),
            code: Set(request.code),
            category_id: Set(parent.id),
            ..Default::default()
        }
        .insert(db)
        .await?;

        self.announce(RegistryKind::SubCategory, model.id, &model.code).await;
        Ok(model)
    }

    #[instrument(skip(self))]
    pub async fn list_subcategories(
        &self,
        category_id: Option<i32>,
    ) -> Result<Vec<sub_category::Model>, ServiceError> {
        let mut query = sub_category::Entity::find();
        if let Some(id) = category_id {
            query = query.filter(sub_category::Column::CategoryId.eq(id));
        }
        Ok(query
            .order_by_asc(sub_category::Column::CategoryId)
            .order_by_asc(sub_category::Column::Code)
            .all(self.db_pool.as_ref())
            .await?)
    }

    async fn announce(&self, kind: RegistryKind, id: i32, code: &str) {
        info!(kind = kind.as_str(), id, code, "Registry record created");
        self.event_sender
            .send_or_log(Event::RegistryRecordCreated {
                kind,
                id,
                code: code.to_string(),
            })
            .await;
    }
}

pub(crate) async fn find_location_by_code<C: ConnectionTrait>(
    conn: &C,
    code: &str,
) -> Result<Option<location::Model>, ServiceError> {
    Ok(location::Entity::find()
        .filter(location::Column::Code.eq(code))
        .one(conn)
        .await?)
}

pub(crate) async fn find_location_by_name<C: ConnectionTrait>(
    conn: &C,
    name: &str,
) -> Result<Option<location::Model>, ServiceError> {
    Ok(location::Entity::find()
        .filter(location::Column::Name.eq(name))
        .one(conn)
        .await?)
}

pub(crate) async fn find_sublocation_by_code<C: ConnectionTrait>(
    conn: &C,
    location_id: i32,
    code: &str,
) -> Result<Option<sub_location::Model>, ServiceError> {
    Ok(sub_location::Entity::find()
        .filter(sub_location::Column::LocationId.eq(location_id))
        .filter(sub_location::Column::Code.eq(code))
        .one(conn)
        .await?)
}

pub(crate) async fn find_category_by_code<C: ConnectionTrait>(
    conn: &C,
    code: &str,
) -> Result<Option<category::Model>, ServiceError> {
    Ok(category::Entity::find()
        .filter(category::Column::Code.eq(code))
        .one(conn)
        .await?)
}

pub(crate) async fn find_category_by_name<C: ConnectionTrait>(
    conn: &C,
    name: &str,
) -> Result<Option<category::Model>, ServiceError> {
    Ok(category::Entity::find()
        .filter(category::Column::Name.eq(name))
        .one(conn)
        .await?)
}

pub(crate) async fn find_subcategory_by_code<C: ConnectionTrait>(
    conn: &C,
    category_id: i32,
    code: &str,
) -> Result<Option<sub_category::Model>, ServiceError> {
    Ok(sub_category::Entity::find()
        .filter(sub_category::Column::CategoryId.eq(category_id))
        .filter(sub_category::Column::Code.eq(code))
        .one(conn)
        .await?)
}
