use chefsign_core::utils::is_blank;
use chefsign_core::{Error, Result};
use http::Method;
use serde::Serialize;
use serde_json::Value;
use std::fmt::{Debug, Formatter};
use std::marker::PhantomData;

/// HTTP verb of a command together with the data the verb carries.
#[derive(Debug, Clone, PartialEq)]
pub enum Verb {
    /// Read a resource.
    Get,
    /// Remove a resource.
    Delete,
    /// Create a resource from the entity.
    Post(Value),
    /// Replace a resource with the entity.
    Put(Value),
}

impl Verb {
    /// The http method of this verb.
    pub fn method(&self) -> Method {
        match self {
            Verb::Get => Method::GET,
            Verb::Delete => Method::DELETE,
            Verb::Post(_) => Method::POST,
            Verb::Put(_) => Method::PUT,
        }
    }

    /// The request entity, only POST and PUT carry one.
    pub fn entity(&self) -> Option<&Value> {
        match self {
            Verb::Get | Verb::Delete => None,
            Verb::Post(v) | Verb::Put(v) => Some(v),
        }
    }
}

/// One Chef REST operation.
///
/// `T` is the type the response body is decoded into. Raw commands keep the
/// body as a plain string instead.
///
/// ```
/// use chefsign_chef_server::{resource, ChefCommand};
/// use serde_json::Value;
///
/// let cmd: ChefCommand<Value> = ChefCommand::get(resource::item(resource::NODES, "web-1"));
/// assert_eq!(cmd.resource(), "nodes/web-1");
/// ```
pub struct ChefCommand<T> {
    verb: Verb,
    resource: String,
    query: Option<String>,
    raw: bool,
    result: PhantomData<fn() -> T>,
}

impl<T> Clone for ChefCommand<T> {
    fn clone(&self) -> Self {
        Self {
            verb: self.verb.clone(),
            resource: self.resource.clone(),
            query: self.query.clone(),
            raw: self.raw,
            result: PhantomData,
        }
    }
}

impl<T> Debug for ChefCommand<T> {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ChefCommand")
            .field("verb", &self.verb)
            .field("resource", &self.resource)
            .field("query", &self.query)
            .field("raw", &self.raw)
            .field("result", &std::any::type_name::<T>())
            .finish()
    }
}

impl<T> ChefCommand<T> {
    fn new(verb: Verb, resource: impl Into<String>) -> Self {
        Self {
            verb,
            resource: resource.into(),
            query: None,
            raw: false,
            result: PhantomData,
        }
    }

    /// GET `resource`.
    pub fn get(resource: impl Into<String>) -> Self {
        Self::new(Verb::Get, resource)
    }

    /// DELETE `resource`.
    pub fn delete(resource: impl Into<String>) -> Self {
        Self::new(Verb::Delete, resource)
    }

    /// POST `entity` as json to `resource`.
    pub fn post(resource: impl Into<String>, entity: &impl Serialize) -> Result<Self> {
        Ok(Self::new(Verb::Post(to_value(entity)?), resource))
    }

    /// PUT `entity` as json to `resource`.
    pub fn put(resource: impl Into<String>, entity: &impl Serialize) -> Result<Self> {
        Ok(Self::new(Verb::Put(to_value(entity)?), resource))
    }

    /// POST the entity of another command to `resource`.
    pub fn post_from<U>(resource: impl Into<String>, inner: ChefCommand<U>) -> Result<Self> {
        Ok(Self::new(Verb::Post(inner.into_entity()?), resource))
    }

    /// PUT the entity of another command to `resource`.
    pub fn put_from<U>(resource: impl Into<String>, inner: ChefCommand<U>) -> Result<Self> {
        Ok(Self::new(Verb::Put(inner.into_entity()?), resource))
    }

    /// Append a query string, a blank query is ignored.
    pub fn with_query(mut self, query: impl Into<String>) -> Self {
        let query = query.into();
        self.query = if is_blank(&query) {
            None
        } else {
            Some(query.trim_start_matches('?').to_string())
        };
        self
    }

    /// Keep the response body as a plain string instead of decoding it.
    pub fn raw(mut self) -> Self {
        self.raw = true;
        self
    }

    /// Verb of this command.
    pub fn verb(&self) -> &Verb {
        &self.verb
    }

    /// Http method of this command.
    pub fn method(&self) -> Method {
        self.verb.method()
    }

    /// Resource path without organization prefix.
    pub fn resource(&self) -> &str {
        &self.resource
    }

    /// Query string without the leading `?`.
    pub fn query(&self) -> Option<&str> {
        self.query.as_deref()
    }

    /// Whether the response is kept as a plain string.
    pub fn is_raw(&self) -> bool {
        self.raw
    }

    /// Take the request entity out of this command.
    pub fn into_entity(self) -> Result<Value> {
        let label = self.describe();
        match self.verb {
            Verb::Post(v) | Verb::Put(v) => Ok(v),
            Verb::Get | Verb::Delete => Err(Error::request_invalid(format!(
                "{label} carries no request entity"
            ))),
        }
    }

    /// Serialized request body, empty for GET and DELETE.
    pub fn body(&self) -> Result<Vec<u8>> {
        match self.verb.entity() {
            Some(v) => serde_json::to_vec(v).map_err(|e| {
                Error::request_invalid("failed to serialize request entity").with_source(e)
            }),
            None => Ok(Vec::new()),
        }
    }

    /// Short identity used in logs and errors, for example `GET nodes/web-1`.
    pub fn describe(&self) -> String {
        format!("{} {}", self.verb.method(), self.resource)
    }
}

fn to_value(entity: &impl Serialize) -> Result<Value> {
    serde_json::to_value(entity)
        .map_err(|e| Error::request_invalid("failed to serialize request entity").with_source(e))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::resource;
    use pretty_assertions::assert_eq;
    use serde::Deserialize;
    use std::collections::BTreeMap;

    #[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
    struct Node {
        name: String,
        chef_environment: String,
        run_list: Vec<String>,
        normal: BTreeMap<String, Value>,
    }

    fn node() -> Node {
        Node {
            name: "web-1".to_string(),
            chef_environment: "_default".to_string(),
            run_list: vec!["role[base]".to_string(), "role[web]".to_string()],
            normal: BTreeMap::from([
                ("tags".to_string(), serde_json::json!(["a", "b"])),
                ("nested".to_string(), serde_json::json!({"port": 8080, "tls": true})),
            ]),
        }
    }

    #[test]
    fn test_verbs() {
        let cmd: ChefCommand<Value> = ChefCommand::get("nodes");
        assert_eq!(cmd.method(), Method::GET);
        assert!(cmd.body().unwrap().is_empty());

        let cmd: ChefCommand<Value> = ChefCommand::delete(resource::item(resource::NODES, "web-1"));
        assert_eq!(cmd.method(), Method::DELETE);
        assert_eq!(cmd.describe(), "DELETE nodes/web-1");

        let cmd: ChefCommand<Value> = ChefCommand::put("nodes/web-1", &node()).unwrap();
        assert_eq!(cmd.method(), Method::PUT);
        assert!(cmd.verb().entity().is_some());
    }

    #[test]
    fn test_entity_round_trip() {
        let cmd: ChefCommand<Value> = ChefCommand::post(resource::NODES, &node()).unwrap();
        let body = cmd.body().unwrap();
        let parsed: Node = serde_json::from_slice(&body).unwrap();
        assert_eq!(parsed, node());
    }

    #[test]
    fn test_nested_command_entity_round_trip() {
        let inner: ChefCommand<Value> = ChefCommand::put("nodes/web-1", &node()).unwrap();
        let outer: ChefCommand<Node> = ChefCommand::post_from(resource::NODES, inner).unwrap();

        assert_eq!(outer.method(), Method::POST);
        let parsed: Node = serde_json::from_slice(&outer.body().unwrap()).unwrap();
        assert_eq!(parsed, node());
    }

    #[test]
    fn test_nested_command_without_entity_fails() {
        let inner: ChefCommand<Value> = ChefCommand::get("nodes/web-1");
        let err = ChefCommand::<Value>::put_from("nodes/web-1", inner).unwrap_err();
        assert_eq!(err.kind(), chefsign_core::ErrorKind::RequestInvalid);
    }

    #[test]
    fn test_query_and_raw() {
        let cmd: ChefCommand<Value> = ChefCommand::get("search/node")
            .with_query("?q=role:web")
            .raw();
        assert_eq!(cmd.query(), Some("q=role:web"));
        assert!(cmd.is_raw());

        let cmd: ChefCommand<Value> = ChefCommand::get("nodes").with_query("  ");
        assert_eq!(cmd.query(), None);
        assert!(!cmd.is_raw());
    }
}
