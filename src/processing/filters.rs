//! Render modes and the per-mode filter/kernel tables.
//!
//! Each [`RenderMode`] owns one static [`FilterTable`]. Up/Down stepping,
//! wrap points and kernel derivation all read from that table, so every
//! mode's cycle can be exercised in isolation.

/// Mutually exclusive display pipelines selected by the digit keys.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RenderMode {
    /// Passthrough and colour filters.
    #[default]
    Plain,
    /// Edge-detection style kernels.
    EdgeDetect,
    /// Square gaussian blur with a small odd kernel.
    Blur,
    /// Wide gaussian blur sweeping a large radius.
    WideBlur,
}

/// How the kernel size follows the filter index.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KernelRule {
    /// Kernel is not consulted by this mode and stays where it is.
    Unused,
    /// Kernel is looked up from the new filter index; unlisted indices map to 0.
    Lookup(&'static [(u32, u32)]),
    /// Kernel moves by `step` alongside the filter and jumps to the
    /// `at_first`/`at_last` value when the filter wraps.
    Stride { step: u32, at_first: u32, at_last: u32 },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FilterTable {
    pub first: u32,
    pub last: u32,
    pub step: u32,
    pub default_filter: u32,
    pub default_kernel: u32,
    pub kernel: KernelRule,
}

const BLUR_KERNELS: &[(u32, u32)] = &[(1, 3), (2, 5), (3, 7)];

const PLAIN: FilterTable = FilterTable {
    first: 0,
    last: 5,
    step: 1,
    default_filter: 0,
    default_kernel: 3,
    kernel: KernelRule::Unused,
};

const EDGE_DETECT: FilterTable = FilterTable {
    first: 0,
    last: 3,
    step: 1,
    default_filter: 0,
    default_kernel: 3,
    kernel: KernelRule::Unused,
};

const BLUR: FilterTable = FilterTable {
    first: 0,
    last: 3,
    step: 1,
    default_filter: 0,
    default_kernel: 3,
    kernel: KernelRule::Lookup(BLUR_KERNELS),
};

// Literal progression: 3, 8, .., 128 with kernels 7, 17, .., 257.
const WIDE_BLUR: FilterTable = FilterTable {
    first: 3,
    last: 128,
    step: 5,
    default_filter: 3,
    default_kernel: 7,
    kernel: KernelRule::Stride {
        step: 10,
        at_first: 7,
        at_last: 257,
    },
};

impl RenderMode {
    pub const ALL: [Self; 4] = [Self::Plain, Self::EdgeDetect, Self::Blur, Self::WideBlur];

    /// Mode bound to digit keys 1..=4.
    pub fn from_digit(digit: u8) -> Option<Self> {
        match digit {
            1 => Some(Self::Plain),
            2 => Some(Self::EdgeDetect),
            3 => Some(Self::Blur),
            4 => Some(Self::WideBlur),
            _ => None,
        }
    }

    pub const fn table(self) -> &'static FilterTable {
        match self {
            Self::Plain => &PLAIN,
            Self::EdgeDetect => &EDGE_DETECT,
            Self::Blur => &BLUR,
            Self::WideBlur => &WIDE_BLUR,
        }
    }

    /// Value handed to the shader's `mode` uniform.
    pub const fn shader_index(self) -> u32 {
        match self {
            Self::Plain => 0,
            Self::EdgeDetect => 1,
            Self::Blur => 2,
            Self::WideBlur => 3,
        }
    }
}

impl FilterTable {
    /// Number of distinct filter indices in one full cycle.
    pub const fn cycle_len(&self) -> u32 {
        (self.last - self.first) / self.step + 1
    }

    fn kernel_after_step(&self, filter: u32, kernel: u32, wrapped: bool, forward: bool) -> u32 {
        match self.kernel {
            KernelRule::Unused => kernel,
            KernelRule::Lookup(pairs) => pairs
                .iter()
                .find(|(f, _)| *f == filter)
                .map_or(0, |(_, k)| *k),
            KernelRule::Stride {
                step,
                at_first,
                at_last,
            } => match (wrapped, forward) {
                (true, true) => at_first,
                (true, false) => at_last,
                (false, true) => kernel + step,
                (false, false) => kernel.saturating_sub(step),
            },
        }
    }
}

/// Active mode plus its sub-selector and derived kernel size.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FilterState {
    mode: RenderMode,
    filter: u32,
    kernel: u32,
}

impl Default for FilterState {
    fn default() -> Self {
        Self::for_mode(RenderMode::default())
    }
}

impl FilterState {
    /// Fresh state for `mode`, sitting on that mode's defaults.
    pub fn for_mode(mode: RenderMode) -> Self {
        let table = mode.table();
        Self {
            mode,
            filter: table.default_filter,
            kernel: table.default_kernel,
        }
    }

    pub fn mode(&self) -> RenderMode {
        self.mode
    }

    pub fn filter(&self) -> u32 {
        self.filter
    }

    pub fn kernel(&self) -> u32 {
        self.kernel
    }

    /// Switch modes. Returns false when `mode` is already active.
    pub fn select(&mut self, mode: RenderMode) -> bool {
        if self.mode == mode {
            return false;
        }
        *self = Self::for_mode(mode);
        true
    }

    /// Return to the active mode's defaults.
    pub fn reset(&mut self) {
        *self = Self::for_mode(self.mode);
    }

    /// Advance one step, wrapping from the last index to the first.
    pub fn step_up(&mut self) {
        let table = self.mode.table();
        let wrapped = self.filter >= table.last;
        self.filter = if wrapped {
            table.first
        } else {
            self.filter + table.step
        };
        self.kernel = table.kernel_after_step(self.filter, self.kernel, wrapped, true);
    }

    /// Step back one index, wrapping from the first index to the last.
    pub fn step_down(&mut self) {
        let table = self.mode.table();
        let wrapped = self.filter <= table.first;
        self.filter = if wrapped {
            table.last
        } else {
            self.filter - table.step
        };
        self.kernel = table.kernel_after_step(self.filter, self.kernel, wrapped, false);
    }
}
