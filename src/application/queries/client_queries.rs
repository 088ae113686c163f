//! Client Queries

use crate::application::pagination::PageRequest;
use crate::application::ports::ClientFilter;
use crate::domain::customer::ClientId;

#[derive(Debug, Clone)]
pub struct GetClient {
    pub id: ClientId,
}

#[derive(Debug, Clone)]
pub struct GetClientByEmail {
    pub email: String,
}

#[derive(Debug, Clone, Default)]
pub struct ListClients {
    pub filter: ClientFilter,
    pub page: PageRequest,
}
