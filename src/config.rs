use crate::executor::PanicStrategy;

#[derive(Debug, Clone)]
pub struct Config {
    pub num_workers: usize,
    pub max_priority: usize,
    pub max_pending_tasks: usize,
    pub thread_name_prefix: String,
    pub stack_size: Option<usize>,
    pub panic_strategy: PanicStrategy,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            num_workers: num_cpus::get(),
            max_priority: 4,
            max_pending_tasks: 1024,
            thread_name_prefix: "prio-worker".to_string(),
            stack_size: Some(2 * 1024 * 1024),
            panic_strategy: PanicStrategy::default(),
        }
    }
}

// anything below 1 becomes 1
fn coerce(value: isize) -> usize {
    value.max(1) as usize
}

impl Config {
    pub fn builder() -> ConfigBuilder {
        ConfigBuilder::new()
    }

    /// Build a config from raw, possibly non-positive limits.
    ///
    /// Non-positive worker counts, priority bounds and pending-task bounds are
    /// coerced to 1 rather than rejected.
    pub fn from_limits(num_workers: isize, max_priority: isize, max_pending_tasks: isize) -> Self {
        Self {
            num_workers: coerce(num_workers),
            max_priority: coerce(max_priority),
            max_pending_tasks: coerce(max_pending_tasks),
            ..Self::default()
        }
    }

    /// Coerce zero counts up to 1.
    pub fn normalized(mut self) -> Self {
        self.num_workers = self.num_workers.max(1);
        self.max_priority = self.max_priority.max(1);
        self.max_pending_tasks = self.max_pending_tasks.max(1);
        self
    }

    /// Number of priority levels, `0..=max_priority`.
    pub fn levels(&self) -> usize {
        self.max_priority + 1
    }
}

#[derive(Debug, Default)]
pub struct ConfigBuilder {
    config: Config,
}

impl ConfigBuilder {
    pub fn new() -> Self {
        Self {
            config: Config::default(),
        }
    }

    pub fn num_workers(mut self, n: usize) -> Self {
        self.config.num_workers = n;
        self
    }

    pub fn max_priority(mut self, p: usize) -> Self {
        self.config.max_priority = p;
        self
    }

    pub fn max_pending_tasks(mut self, n: usize) -> Self {
        self.config.max_pending_tasks = n;
        self
    }

    pub fn thread_name_prefix<S: Into<String>>(mut self, prefix: S) -> Self {
        self.config.thread_name_prefix = prefix.into();
        self
    }

    pub fn stack_size(mut self, size: usize) -> Self {
        self.config.stack_size = Some(size);
        self
    }

    pub fn panic_strategy(mut self, strategy: PanicStrategy) -> Self {
        self.config.panic_strategy = strategy;
        self
    }

    pub fn build(self) -> Config {
        self.config.normalized()
    }
}
