//! Publisher Queries

use crate::application::pagination::PageRequest;
use crate::application::ports::PublisherFilter;
use crate::domain::catalog::PublisherId;

#[derive(Debug, Clone)]
pub struct GetPublisher {
    pub id: PublisherId,
}

#[derive(Debug, Clone, Default)]
pub struct ListPublishers {
    pub filter: PublisherFilter,
    pub page: PageRequest,
}
