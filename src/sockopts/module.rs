//! Host-facing module interface.
//!
//! The host drives a module through four lifecycle points: create a config
//! per scope, hand it directives, merge child scopes over parents, and run
//! the initializer against the listener registry at (re)start.

use crate::host::{CommandContext, ConfigStore, ListenerRegistry, ScopeId};
use crate::sockopts::apply::{apply_to_listeners, ApplyReport, SocketOptionSetter, SystemSetter};
use crate::sockopts::directives::{handle_directive, Directive, DirectiveError, ParsePolicy};
use crate::sockopts::options::SocketOptionsConfig;

/// Parameters of one directive invocation.
pub struct CommandParms<'a, C> {
    /// Section the directive appeared in.
    pub context: &'a CommandContext,
    /// Scope whose parser is running.
    pub scope: ScopeId,
    /// Module configs for every scope.
    pub store: &'a mut ConfigStore<C>,
}

/// Capabilities a loadable server module offers the host.
pub trait ServerModule {
    type Config: Clone;

    /// Identifier used in log events.
    fn name(&self) -> &'static str;

    /// Fresh config for a new server scope.
    fn create_server_config(&self) -> Self::Config;

    /// Compose a child scope's config over its parent's.
    fn merge_server_config(&self, parent: &Self::Config, child: &Self::Config) -> Self::Config;

    /// Handle a directive. Returns `Ok(false)` when the name is not one of
    /// this module's directives so the host can offer it elsewhere.
    fn handle_directive(
        &self,
        cmd: &mut CommandParms<'_, Self::Config>,
        name: &str,
        args: &[&str],
    ) -> Result<bool, DirectiveError>;

    /// Server (re)initialization hook.
    fn init(&mut self, server: &Self::Config, listeners: &ListenerRegistry) -> ApplyReport;
}

/// The socket options module.
#[derive(Debug, Clone, Default)]
pub struct SockoptsModule<S = SystemSetter> {
    policy: ParsePolicy,
    setter: S,
}

impl SockoptsModule<SystemSetter> {
    pub fn new(policy: ParsePolicy) -> Self {
        Self {
            policy,
            setter: SystemSetter,
        }
    }
}

impl<S: SocketOptionSetter> SockoptsModule<S> {
    /// Module issuing its system calls through `setter`.
    pub fn with_setter(policy: ParsePolicy, setter: S) -> Self {
        Self { policy, setter }
    }

    pub fn policy(&self) -> ParsePolicy {
        self.policy
    }

    pub fn set_policy(&mut self, policy: ParsePolicy) {
        self.policy = policy;
    }

    pub fn setter(&self) -> &S {
        &self.setter
    }
}

impl<S: SocketOptionSetter> ServerModule for SockoptsModule<S> {
    type Config = SocketOptionsConfig;

    fn name(&self) -> &'static str {
        "sockopts_module"
    }

    fn create_server_config(&self) -> SocketOptionsConfig {
        SocketOptionsConfig::new()
    }

    fn merge_server_config(
        &self,
        parent: &SocketOptionsConfig,
        child: &SocketOptionsConfig,
    ) -> SocketOptionsConfig {
        SocketOptionsConfig::merge(parent, child)
    }

    fn handle_directive(
        &self,
        cmd: &mut CommandParms<'_, SocketOptionsConfig>,
        name: &str,
        args: &[&str],
    ) -> Result<bool, DirectiveError> {
        let Some(directive) = Directive::lookup(name) else {
            return Ok(false);
        };

        // Every directive here is global-only, so values always land in the
        // main server's record whichever scope is being parsed.
        handle_directive(directive, cmd.context, args, self.policy, cmd.store.main_mut())?;
        Ok(true)
    }

    fn init(&mut self, server: &SocketOptionsConfig, listeners: &ListenerRegistry) -> ApplyReport {
        tracing::debug!(module = self.name(), listeners = listeners.len(), "Running module initializer");
        apply_to_listeners(server, listeners, &mut self.setter)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::host::ListenRecord;
    use crate::sockopts::options::SocketOption;
    use std::io;
    use std::os::fd::RawFd;

    #[derive(Default)]
    struct CountingSetter(usize);

    impl SocketOptionSetter for CountingSetter {
        fn set_option(&mut self, _fd: RawFd, _option: SocketOption) -> io::Result<()> {
            self.0 += 1;
            Ok(())
        }
    }

    fn module() -> SockoptsModule<CountingSetter> {
        SockoptsModule::with_setter(ParsePolicy::Lenient, CountingSetter::default())
    }

    #[test]
    fn unknown_directive_is_not_handled() {
        let m = module();
        let mut store = ConfigStore::new(m.create_server_config());
        let mut cmd = CommandParms {
            context: &CommandContext::Global,
            scope: ScopeId::Main,
            store: &mut store,
        };
        assert_eq!(m.handle_directive(&mut cmd, "KeepAlive", &["On"]), Ok(false));
        assert!(store.main().is_empty());
    }

    #[test]
    fn virtual_host_parser_writes_main_record() {
        let m = module();
        let mut store = ConfigStore::new(m.create_server_config());
        let vh = store.add_virtual_host("www.example.com", m.create_server_config());

        let mut cmd = CommandParms {
            context: &CommandContext::Global,
            scope: vh,
            store: &mut store,
        };
        assert_eq!(m.handle_directive(&mut cmd, "SoSoSndBuf", &["2048"]), Ok(true));

        assert_eq!(store.main().send_buffer_size, Some(2048));
        assert!(store.get(vh).unwrap().is_empty());

        let effective = store
            .effective(vh, |p, c| m.merge_server_config(p, c))
            .unwrap();
        assert_eq!(effective.send_buffer_size, Some(2048));
    }

    #[test]
    fn directive_inside_virtual_host_is_rejected() {
        let m = module();
        let mut store = ConfigStore::new(m.create_server_config());
        let vh = store.add_virtual_host("www.example.com", m.create_server_config());
        let ctx = CommandContext::VirtualHost {
            server_name: "www.example.com".into(),
        };
        let mut cmd = CommandParms {
            context: &ctx,
            scope: vh,
            store: &mut store,
        };
        let err = m
            .handle_directive(&mut cmd, "SoTcpDeferAccept", &["20"])
            .unwrap_err();
        assert!(matches!(err, DirectiveError::Context(_)));
        assert!(store.main().is_empty());
    }

    #[test]
    fn init_applies_main_config() {
        let mut m = module();
        let mut store = ConfigStore::new(m.create_server_config());
        let mut cmd = CommandParms {
            context: &CommandContext::Global,
            scope: ScopeId::Main,
            store: &mut store,
        };
        m.handle_directive(&mut cmd, "SoSoRcvBuf", &["4096"]).unwrap();
        m.handle_directive(&mut cmd, "SoSoSndBuf", &["4096"]).unwrap();

        let listeners: ListenerRegistry = [ListenRecord::from_raw_fd(11, None)].into_iter().collect();
        let report = m.init(store.main(), &listeners);
        assert_eq!(report.applied.len(), 2);
        assert_eq!(m.setter().0, 2);

        // Restart re-applies against the same listeners.
        m.init(store.main(), &listeners);
        assert_eq!(m.setter().0, 4);
    }

    #[test]
    fn module_reports_its_name() {
        assert_eq!(module().name(), "sockopts_module");
    }

    #[test]
    fn policy_change_applies_to_later_directives() {
        let mut m = module();
        assert_eq!(m.policy(), ParsePolicy::Lenient);
        let mut store = ConfigStore::new(m.create_server_config());

        let mut cmd = CommandParms {
            context: &CommandContext::Global,
            scope: ScopeId::Main,
            store: &mut store,
        };
        assert_eq!(m.handle_directive(&mut cmd, "SoSoSndBuf", &["8k"]), Ok(true));

        m.set_policy(ParsePolicy::Strict);
        assert_eq!(m.policy(), ParsePolicy::Strict);
        let err = m.handle_directive(&mut cmd, "SoSoSndBuf", &["16k"]).unwrap_err();
        assert!(matches!(err, DirectiveError::InvalidValue { .. }));

        assert_eq!(store.main().send_buffer_size, Some(8));
    }
}
