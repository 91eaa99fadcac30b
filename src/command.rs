use heapless::Deque;

/// Capacity of the pending command queue
///
/// Fits a power toggle plus a full sweep of both 255-rung ladders.
pub const QUEUE_CAPACITY: usize = 512;

/// Single button press that can be emitted to the lamp
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepCommand {
    /// Turn the light on
    PowerOn,
    /// Turn the light off
    PowerOff,
    /// One rung up the brightness ladder
    BrightnessUp,
    /// One rung down the brightness ladder
    BrightnessDown,
    /// One rung towards `max_mireds`
    ColorWarmer,
    /// One rung towards `min_mireds`
    ColorCooler,
}

impl StepCommand {
    /// Power token for the requested state
    pub const fn power(on: bool) -> Self {
        if on { Self::PowerOn } else { Self::PowerOff }
    }

    /// Brightness token moving in the direction of `delta`
    pub const fn brightness(delta: i16) -> Self {
        if delta > 0 {
            Self::BrightnessUp
        } else {
            Self::BrightnessDown
        }
    }

    /// Color temperature token moving in the direction of `delta`
    pub const fn color_temp(delta: i16) -> Self {
        if delta > 0 {
            Self::ColorWarmer
        } else {
            Self::ColorCooler
        }
    }

    pub const fn is_power(self) -> bool {
        matches!(self, Self::PowerOn | Self::PowerOff)
    }

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::PowerOn => "power_on",
            Self::PowerOff => "power_off",
            Self::BrightnessUp => "brightness_up",
            Self::BrightnessDown => "brightness_down",
            Self::ColorWarmer => "color_warmer",
            Self::ColorCooler => "color_cooler",
        }
    }
}

/// Ordered commands waiting to be emitted
#[derive(Debug, Default)]
pub struct CommandQueue {
    inner: Deque<StepCommand, QUEUE_CAPACITY>,
}

impl CommandQueue {
    pub const fn new() -> Self {
        Self {
            inner: Deque::new(),
        }
    }

    /// Push a command to the back of the queue
    ///
    /// Returns the command if the queue is full
    pub fn push(&mut self, command: StepCommand) -> Result<(), StepCommand> {
        self.inner.push_back(command)
    }

    /// Push `count` copies of a command
    ///
    /// Returns the command if the queue ran out of space
    pub fn push_repeated(&mut self, command: StepCommand, count: u16) -> Result<(), StepCommand> {
        for _ in 0..count {
            self.push(command)?;
        }
        Ok(())
    }

    /// Pop the next command to emit
    pub fn pop(&mut self) -> Option<StepCommand> {
        self.inner.pop_front()
    }

    /// Peek at the next command to emit
    pub fn front(&self) -> Option<StepCommand> {
        self.inner.front().copied()
    }

    /// Keep only the commands matching `keep`, in order
    pub fn retain(&mut self, mut keep: impl FnMut(StepCommand) -> bool) {
        for _ in 0..self.inner.len() {
            if let Some(command) = self.inner.pop_front() {
                if keep(command) {
                    // Room was just freed by the pop
                    let pushed = self.inner.push_back(command);
                    debug_assert!(pushed.is_ok());
                }
            }
        }
    }

    /// Drop every pending command
    pub fn clear(&mut self) {
        self.inner.clear();
    }

    pub fn len(&self) -> usize {
        self.inner.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }

    /// Iterate pending commands in emission order
    pub fn iter(&self) -> impl Iterator<Item = StepCommand> + '_ {
        self.inner.iter().copied()
    }

    /// Number of pending commands equal to `command`
    pub fn count_of(&self, command: StepCommand) -> usize {
        self.iter().filter(|queued| *queued == command).count()
    }
}
