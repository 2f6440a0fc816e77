//! Per-scope module configuration store.
//!
//! Holds one module config for the main server and one per virtual host, in
//! declaration order. Effective configs are produced by merging each virtual
//! host's record over the main server's.

/// Which server scope a config belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ScopeId {
    Main,
    VirtualHost(usize),
}

#[derive(Debug, Clone)]
struct VirtualHostScope<C> {
    server_name: String,
    config: C,
}

/// Module configuration for every server scope.
#[derive(Debug, Clone)]
pub struct ConfigStore<C> {
    main: C,
    virtual_hosts: Vec<VirtualHostScope<C>>,
}

impl<C: Clone> ConfigStore<C> {
    /// Store holding only the main server's config.
    pub fn new(main: C) -> Self {
        Self {
            main,
            virtual_hosts: Vec::new(),
        }
    }

    /// Register a virtual host scope with its freshly created config.
    pub fn add_virtual_host(&mut self, server_name: impl Into<String>, config: C) -> ScopeId {
        self.virtual_hosts.push(VirtualHostScope {
            server_name: server_name.into(),
            config,
        });
        ScopeId::VirtualHost(self.virtual_hosts.len() - 1)
    }

    pub fn main(&self) -> &C {
        &self.main
    }

    pub fn main_mut(&mut self) -> &mut C {
        &mut self.main
    }

    /// Config recorded for `scope`, before any merge. `None` for an unknown
    /// virtual host index.
    pub fn get(&self, scope: ScopeId) -> Option<&C> {
        match scope {
            ScopeId::Main => Some(&self.main),
            ScopeId::VirtualHost(i) => self.virtual_hosts.get(i).map(|v| &v.config),
        }
    }

    pub fn server_name(&self, scope: ScopeId) -> Option<&str> {
        match scope {
            ScopeId::Main => None,
            ScopeId::VirtualHost(i) => self.virtual_hosts.get(i).map(|v| v.server_name.as_str()),
        }
    }

    pub fn virtual_host_count(&self) -> usize {
        self.virtual_hosts.len()
    }

    /// Effective config for `scope`: the virtual host's record merged over
    /// the main server's.
    pub fn effective<F>(&self, scope: ScopeId, merge: F) -> Option<C>
    where
        F: Fn(&C, &C) -> C,
    {
        match scope {
            ScopeId::Main => Some(self.main.clone()),
            ScopeId::VirtualHost(i) => self
                .virtual_hosts
                .get(i)
                .map(|v| merge(&self.main, &v.config)),
        }
    }
}
