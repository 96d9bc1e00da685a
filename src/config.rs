//! Translation options.

/// Compile-time limits baked into the emitted runtime as `#define`s.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RuntimeLimits {
    /// Scratch buffer size for number/bool formatting and line input (`KUDA_MAX_STR`).
    pub max_str: usize,
    /// Upper bound on matrix rows and columns (`KUDA_MAX_MAT`).
    pub max_matrix_dim: usize,
    /// Initial capacity of a fresh list (`KUDA_LIST_INIT_CAP`).
    pub list_capacity: usize,
}

impl Default for RuntimeLimits {
    fn default() -> Self {
        Self {
            max_str: 4096,
            max_matrix_dim: 512,
            list_capacity: 16,
        }
    }
}

impl RuntimeLimits {
    /// The `#define` block emitted ahead of the runtime library.
    pub fn defines(&self) -> String {
        format!(
            "#define KUDA_MAX_STR {}\n#define KUDA_MAX_MAT {}\n#define KUDA_LIST_INIT_CAP {}\n",
            self.max_str.max(64),
            self.max_matrix_dim.max(1),
            self.list_capacity.max(1)
        )
    }
}

/// Options for a translation run.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct TranslateOptions {
    pub runtime: RuntimeLimits,
    /// Fixed seed for the C random generator. `None` seeds from the wall clock.
    pub rng_seed: Option<u32>,
}

impl TranslateOptions {
    pub fn with_seed(mut self, seed: u32) -> Self {
        self.rng_seed = Some(seed);
        self
    }

    pub fn with_limits(mut self, runtime: RuntimeLimits) -> Self {
        self.runtime = runtime;
        self
    }

    /// The statement `main` opens with.
    pub(crate) fn seed_statement(&self) -> String {
        match self.rng_seed {
            Some(seed) => format!("srand({}u);", seed),
            None => "srand((unsigned)time(NULL));".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_limits() {
        let limits = RuntimeLimits::default();
        assert_eq!(limits.max_str, 4096);
        assert_eq!(limits.max_matrix_dim, 512);
        assert_eq!(limits.list_capacity, 16);
        let defines = limits.defines();
        assert!(defines.contains("#define KUDA_MAX_MAT 512"));
        assert!(defines.contains("#define KUDA_LIST_INIT_CAP 16"));
    }

    #[test]
    fn test_seed_statement() {
        assert_eq!(
            TranslateOptions::default().seed_statement(),
            "srand((unsigned)time(NULL));"
        );
        assert_eq!(TranslateOptions::default().with_seed(7).seed_statement(), "srand(7u);");
    }
}
