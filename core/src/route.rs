//! Paths the console navigates between.

use std::fmt;

use crate::types::EntityId;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ResourceKind {
    Customers,
    Products,
}

impl ResourceKind {
    pub fn segment(self) -> &'static str {
        match self {
            ResourceKind::Customers => "customers",
            ResourceKind::Products => "products",
        }
    }

    fn from_segment(segment: &str) -> Option<Self> {
        match segment {
            "customers" => Some(ResourceKind::Customers),
            "products" => Some(ResourceKind::Products),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Route {
    Dashboard,
    List(ResourceKind),
    Add(ResourceKind),
    Edit(ResourceKind, EntityId),
}

impl Route {
    pub fn path(&self) -> String {
        match self {
            Route::Dashboard => "/".to_string(),
            Route::List(kind) => format!("/{}", kind.segment()),
            Route::Add(kind) => format!("/{}/add", kind.segment()),
            Route::Edit(kind, id) => format!("/{}/edit/{id}", kind.segment()),
        }
    }

    /// `None` for anything the console has no view for.
    pub fn parse(path: &str) -> Option<Route> {
        let segments: Vec<&str> =
            path.trim_matches('/').split('/').filter(|s| !s.is_empty()).collect();
        match segments.as_slice() {
            [] => Some(Route::Dashboard),
            [resource] => ResourceKind::from_segment(resource).map(Route::List),
            [resource, "add"] => ResourceKind::from_segment(resource).map(Route::Add),
            [resource, "edit", id] => {
                let kind = ResourceKind::from_segment(resource)?;
                let id = id.parse().ok()?;
                Some(Route::Edit(kind, id))
            }
            _ => None,
        }
    }
}

impl fmt::Display for Route {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.path())
    }
}
