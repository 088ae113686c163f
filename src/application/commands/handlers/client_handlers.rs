//! Client Command Handlers

use chrono::Utc;
use std::sync::Arc;
use uuid::Uuid;

use super::image_support::{discard_image, stage_image};
use crate::application::commands::{CreateClient, DeleteClient, UpdateClient, UpdateClientImage};
use crate::application::error::ApplicationError;
use crate::application::ports::{
    ClientCache, ClientRepositoryPort, ImageStoragePort, Notification, NotificationEntity,
    NotificationType, NotifierPort, OrderReference, OrderStorePort,
};
use crate::domain::customer::{Client, ClientId};
use crate::domain::DEFAULT_IMAGE;

async fn find_client(
    repo: &dyn ClientRepositoryPort,
    id: ClientId,
) -> Result<Client, ApplicationError> {
    repo.find_by_id(id)
        .await?
        .ok_or_else(|| ApplicationError::not_found("Client", id))
}

pub struct CreateClientHandler {
    repo: Arc<dyn ClientRepositoryPort>,
    notifier: Arc<dyn NotifierPort>,
}

impl CreateClientHandler {
    pub fn new(repo: Arc<dyn ClientRepositoryPort>, notifier: Arc<dyn NotifierPort>) -> Self {
        Self { repo, notifier }
    }

    pub async fn handle(&self, command: CreateClient) -> Result<Client, ApplicationError> {
        let now = Utc::now();
        let client = Client {
            id: Uuid::new_v4(),
            name: command.name.trim().to_string(),
            surname: command.surname.trim().to_string(),
            email: command.email.trim().to_string(),
            phone: command.phone.trim().to_string(),
            address: command.address,
            image: command.image.unwrap_or_else(|| DEFAULT_IMAGE.to_string()),
            created_at: now,
            updated_at: now,
        };
        client.validate()?;

        self.repo.insert(&client).await?;

        tracing::info!(client_id = %client.id, "Client created");
        self.notifier.notify(Notification::new(
            NotificationEntity::Clients,
            NotificationType::Create,
            &client,
        ));

        Ok(client)
    }
}

pub struct UpdateClientHandler {
    repo: Arc<dyn ClientRepositoryPort>,
    cache: ClientCache,
    notifier: Arc<dyn NotifierPort>,
}

impl UpdateClientHandler {
    pub fn new(
        repo: Arc<dyn ClientRepositoryPort>,
        cache: ClientCache,
        notifier: Arc<dyn NotifierPort>,
    ) -> Self {
        Self {
            repo,
            cache,
            notifier,
        }
    }

    pub async fn handle(&self, command: UpdateClient) -> Result<Client, ApplicationError> {
        let mut client = find_client(self.repo.as_ref(), command.id).await?;

        client.name = command.name.trim().to_string();
        client.surname = command.surname.trim().to_string();
        client.email = command.email.trim().to_string();
        client.phone = command.phone.trim().to_string();
        client.address = command.address;
        if let Some(image) = command.image {
            client.image = image;
        }
        client.validate()?;
        client.updated_at = Utc::now();

        self.repo.update(&client).await?;
        self.cache.evict(&client.id);

        tracing::info!(client_id = %client.id, "Client updated");
        self.notifier.notify(Notification::new(
            NotificationEntity::Clients,
            NotificationType::Update,
            &client,
        ));

        Ok(client)
    }
}

/// 物理删除；仍有订单引用时冲突
pub struct DeleteClientHandler {
    repo: Arc<dyn ClientRepositoryPort>,
    order_store: Arc<dyn OrderStorePort>,
    storage: Arc<dyn ImageStoragePort>,
    cache: ClientCache,
    notifier: Arc<dyn NotifierPort>,
}

impl DeleteClientHandler {
    pub fn new(
        repo: Arc<dyn ClientRepositoryPort>,
        order_store: Arc<dyn OrderStorePort>,
        storage: Arc<dyn ImageStoragePort>,
        cache: ClientCache,
        notifier: Arc<dyn NotifierPort>,
    ) -> Self {
        Self {
            repo,
            order_store,
            storage,
            cache,
            notifier,
        }
    }

    pub async fn handle(&self, command: DeleteClient) -> Result<(), ApplicationError> {
        let client = find_client(self.repo.as_ref(), command.id).await?;

        if self
            .order_store
            .exists_by(OrderReference::Client(client.id))
            .await?
        {
            return Err(ApplicationError::conflict(format!(
                "Client {} has orders and cannot be deleted",
                client.id
            )));
        }

        self.repo.delete(client.id).await?;
        self.cache.evict(&client.id);
        discard_image(self.storage.as_ref(), &client.image).await;

        tracing::info!(client_id = %client.id, "Client deleted");
        self.notifier.notify(Notification::new(
            NotificationEntity::Clients,
            NotificationType::Delete,
            &client,
        ));

        Ok(())
    }
}

pub struct UpdateClientImageHandler {
    repo: Arc<dyn ClientRepositoryPort>,
    storage: Arc<dyn ImageStoragePort>,
    cache: ClientCache,
    notifier: Arc<dyn NotifierPort>,
}

impl UpdateClientImageHandler {
    pub fn new(
        repo: Arc<dyn ClientRepositoryPort>,
        storage: Arc<dyn ImageStoragePort>,
        cache: ClientCache,
        notifier: Arc<dyn NotifierPort>,
    ) -> Self {
        Self {
            repo,
            storage,
            cache,
            notifier,
        }
    }

    pub async fn handle(&self, command: UpdateClientImage) -> Result<Client, ApplicationError> {
        let mut client = find_client(self.repo.as_ref(), command.id).await?;

        let staged = stage_image(
            self.storage.as_ref(),
            &format!("client-{}", client.id),
            command.upload,
            command.with_url,
            &client.image,
        )
        .await?;
        client.image = staged.reference.clone();
        client.updated_at = Utc::now();

        staged
            .settle(self.storage.as_ref(), self.repo.update(&client).await)
            .await?;
        self.cache.evict(&client.id);

        tracing::info!(client_id = %client.id, image = %client.image, "Client image updated");
        self.notifier.notify(Notification::new(
            NotificationEntity::Clients,
            NotificationType::Update,
            &client,
        ));

        Ok(client)
    }
}
