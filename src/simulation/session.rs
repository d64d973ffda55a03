//! Request bookkeeping around the tree: every change to the request set or
//! the builder options rebuilds the tree and carries the accumulated state
//! over by identity.

use crate::approximation::builder::{self, ApproximationOptions};
use crate::config::SessionConfig;
use crate::error::{OsdError, OsdResult};
use crate::service::resolver::{ServiceResolver, ServicingPath};
use crate::simulation::engine::SaturationEngine;
use crate::simulation::expression::parse_expression;
use crate::simulation::penalty::Penalty;
use crate::state::request::{Point, Request, RequestId};
use crate::state::server::{Position, ServerTrail};
use crate::state::snapshot::TreeSnapshot;
use crate::tree::edge::EdgeKey;
use crate::tree::node::NodeKey;
use crate::tree::tree::Tree;
use std::time::Duration;
use tracing::{info, warn};

pub struct Session {
    config: SessionConfig,
    engine: SaturationEngine,
    resolver: ServiceResolver,
    tree: Tree,
    requests: Vec<Request>,
    trail: ServerTrail,
    pending: Option<ServicingPath>,
    next_id: u32,
    clock: Duration,
    services: usize,
}

impl Session {
    pub fn new(config: SessionConfig) -> Self {
        let engine = SaturationEngine::new(config.default_penalty.clone());
        let resolver = ServiceResolver::new(engine.clone(), config.forwarding, config.single_servicing);
        let tree = builder::build(&[], &config.approximation);
        Self {
            config,
            engine,
            resolver,
            tree,
            requests: Vec::new(),
            trail: ServerTrail::default(),
            pending: None,
            next_id: 0,
            clock: Duration::ZERO,
            services: 0,
        }
    }

    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    pub fn tree(&self) -> &Tree {
        &self.tree
    }

    pub fn requests(&self) -> &[Request] {
        &self.requests
    }

    /// Live view of a request: the tree's leaf when it has one, which holds
    /// the elapsed time consumed so far.
    pub fn request(&self, id: RequestId) -> Option<&Request> {
        self.tree
            .node_by_key(&NodeKey::Request(id))
            .and_then(|n| self.tree.node_by_id(n).request())
            .or_else(|| self.requests.iter().find(|r| r.id() == id))
    }

    pub fn trail(&self) -> &ServerTrail {
        &self.trail
    }

    pub fn pending(&self) -> Option<&ServicingPath> {
        self.pending.as_ref()
    }

    pub fn clock(&self) -> Duration {
        self.clock
    }

    /// Number of servicing paths applied so far.
    pub fn services(&self) -> usize {
        self.services
    }

    pub fn add_request(&mut self, point: Point, penalty: Option<Penalty>) -> RequestId {
        let id = RequestId(self.next_id);
        self.next_id += 1;
        let request = Request::new(id, point);
        self.requests.push(match penalty {
            Some(p) => request.with_penalty(p),
            None => request,
        });
        info!(request = %id, x = point.x, y = point.y, "request added");
        self.rebuild();
        id
    }

    pub fn add_request_expr(&mut self, point: Point, expr: &str) -> OsdResult<RequestId> {
        let penalty = parse_expression(expr)?;
        Ok(self.add_request(point, Some(penalty)))
    }

    pub fn remove_request(&mut self, id: RequestId) -> OsdResult<()> {
        let index = self
            .requests
            .iter()
            .position(|r| r.id() == id)
            .ok_or(OsdError::UnknownRequest(id))?;
        self.requests.remove(index);
        info!(request = %id, "request removed");
        self.rebuild();
        Ok(())
    }

    pub fn set_options(&mut self, options: ApproximationOptions) {
        self.config.approximation = options;
        self.rebuild();
    }

    /// Advances the tree by `dt` and looks for a servicing path unless one
    /// is already waiting to be applied.
    pub fn tick(&mut self, dt: Duration) -> OsdResult<Option<&ServicingPath>> {
        self.clock += dt;
        self.engine.advance(&mut self.tree, dt)?;
        if self.pending.is_none() {
            self.pending = self
                .resolver
                .resolve(&mut self.tree, &self.trail, &self.requests)?;
        }
        Ok(self.pending.as_ref())
    }

    /// Moves the server along the pending path. Returns `false` when there
    /// was nothing to apply.
    pub fn apply_pending(&mut self) -> bool {
        let Some(path) = self.pending.take() else {
            return false;
        };
        self.resolver
            .apply(&mut self.tree, &path, &mut self.trail, &mut self.requests);
        self.services += 1;
        true
    }

    fn rebuild(&mut self) {
        let snapshot = TreeSnapshot::capture(&self.tree);
        let pending = self.pending.take().map(|path| {
            let keys: Vec<EdgeKey> = path.edges().iter().map(|e| self.tree.edge_key(*e)).collect();
            (keys, path.new_server().clone())
        });

        self.tree = builder::build(&self.requests, &self.config.approximation);
        let matched = snapshot.restore(&mut self.tree);
        info!(
            requests = self.requests.len(),
            nodes = self.tree.node_count(),
            edges = self.tree.edge_count(),
            restored = matched,
            "tree rebuilt"
        );

        if let Some((keys, new_server)) = pending {
            let edges = keys.iter().filter_map(|k| self.tree.edge_by_key(k)).collect();
            let new_server = if self.tree.node_by_key(&new_server.key).is_some() {
                new_server
            } else {
                Position::root()
            };
            self.pending = Some(ServicingPath::new(edges, new_server));
        }

        let server_known = self.tree.node_by_key(&self.trail.current().key).is_some();
        if !server_known && self.tree.root().is_some() {
            warn!(server = %self.trail.current().key, "server position vanished, returning to root");
            self.trail.push(Position::root());
        }
    }
}
