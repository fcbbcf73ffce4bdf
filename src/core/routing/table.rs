//! Action dispatch table

use actix_web::http::Method;
use std::collections::HashMap;

/// Static mapping from an action name to an upstream call shape
#[derive(Debug, Clone)]
pub struct ActionRoute {
    /// Upstream HTTP method
    pub method: Method,
    /// Upstream path template with `:name` placeholders
    pub path: String,
    /// Whether the action counts against the search-specific rate limit
    pub search_limited: bool,
}

/// Immutable action-name → route dispatch table
pub struct RouteTable {
    routes: HashMap<String, ActionRoute>,
}

impl RouteTable {
    /// Build an empty table.
    pub fn new() -> Self {
        Self {
            routes: HashMap::new(),
        }
    }

    /// Register a route under an action name.
    pub fn register(&mut self, action: &str, method: Method, path: &str) -> &mut Self {
        self.routes.insert(
            action.to_string(),
            ActionRoute {
                method,
                path: path.to_string(),
                search_limited: false,
            },
        );
        self
    }

    /// Register a route that counts against the search limiter.
    pub fn register_search(&mut self, action: &str, method: Method, path: &str) -> &mut Self {
        self.routes.insert(
            action.to_string(),
            ActionRoute {
                method,
                path: path.to_string(),
                search_limited: true,
            },
        );
        self
    }

    /// The catalog route set served by this gateway.
    pub fn with_default_routes() -> Self {
        let mut table = Self::new();
        table
            .register_search("searchCatalog", Method::GET, "/api/catalog/search")
            .register("getCatalogItem", Method::GET, "/api/catalog/items/:id")
            .register("getServers", Method::GET, "/api/dictionaries/servers")
            .register("getSlotTypes", Method::GET, "/api/dictionaries/slot-types")
            .register("getAttributes", Method::GET, "/api/dictionaries/attributes")
            .register(
                "getItemDefinitions",
                Method::GET,
                "/api/dictionaries/item-definitions",
            )
            .register(
                "getEnhancementCurve",
                Method::GET,
                "/api/dictionaries/enhancement-curve",
            )
            .register(
                "getNotificationFilters",
                Method::GET,
                "/api/notifications/filters",
            )
            .register(
                "createNotificationFilter",
                Method::POST,
                "/api/notifications/filters",
            )
            .register(
                "deleteNotificationFilter",
                Method::DELETE,
                "/api/notifications/filters/:id",
            )
            .register(
                "generateTelegramLink",
                Method::POST,
                "/api/telegram/binding/generate-link",
            )
            .register("getPriceTrends", Method::GET, "/api/analytics/price-trends");
        table
    }

    /// Look up an action; `None` for unknown identifiers.
    pub fn resolve(&self, action: &str) -> Option<&ActionRoute> {
        self.routes.get(action)
    }

    /// Whether the action is subject to the search-specific rate limit.
    ///
    /// Unknown actions are not search-limited; they fail later at route
    /// resolution, keeping the gate order fixed.
    pub fn is_search_action(&self, action: &str) -> bool {
        self.resolve(action).is_some_and(|r| r.search_limited)
    }

    /// Number of registered actions.
    pub fn len(&self) -> usize {
        self.routes.len()
    }

    /// Whether the table has no routes.
    pub fn is_empty(&self) -> bool {
        self.routes.is_empty()
    }
}

impl Default for RouteTable {
    fn default() -> Self {
        Self::with_default_routes()
    }
}
