//! Resource paths on a Chef Server.
//!
//! Paths here never carry the organization prefix, the signer and dispatcher add
//! it for servers that need it.

use crate::ChefContext;

/// Nodes collection.
pub const NODES: &str = "nodes";
/// API clients collection.
pub const CLIENTS: &str = "clients";
/// Roles collection.
pub const ROLES: &str = "roles";
/// Environments collection.
pub const ENVIRONMENTS: &str = "environments";
/// Data bags collection.
pub const DATA: &str = "data";
/// Search endpoint.
pub const SEARCH: &str = "search";

/// Path of one item in a collection: `<collection>/<id>`.
pub fn item(collection: &str, id: &str) -> String {
    format!(
        "{}/{}",
        collection.trim_end_matches('/'),
        id.trim_start_matches('/')
    )
}

/// Path of a data bag, the name is mapped through the context's data bag names.
pub fn data_bag(ctx: &ChefContext, bag: &str) -> String {
    item(DATA, ctx.data_bag_name(bag))
}

/// Path of a data bag item: `data/<bag>/<item>`.
pub fn data_bag_item(ctx: &ChefContext, bag: &str, id: &str) -> String {
    item(&data_bag(ctx, bag), id)
}

/// Search path for an index, for example `search/node`.
pub fn search(index: &str) -> String {
    item(SEARCH, index)
}

/// Run list entry for a role: `role[name]`.
pub fn run_list_role(role: &str) -> String {
    format!("role[{role}]")
}
