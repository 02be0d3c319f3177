/// Permission bits carried by a file in a rendered project.
///
/// Only the executable flag survives from the template tree; everything else
/// is left to the process umask.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Permissions {
    readable: bool,
    writable: bool,
    executable: bool,
}

impl Permissions {
    pub const fn read_write() -> Self {
        Self {
            readable: true,
            writable: true,
            executable: false,
        }
    }

    pub const fn full() -> Self {
        Self {
            readable: true,
            writable: true,
            executable: true,
        }
    }

    /// Read-write, plus the executable bit when `executable` is set.
    pub const fn for_source(executable: bool) -> Self {
        if executable {
            Self::full()
        } else {
            Self::read_write()
        }
    }

    pub const fn readable(&self) -> bool {
        self.readable
    }
    pub const fn writable(&self) -> bool {
        self.writable
    }
    pub const fn executable_flag(&self) -> bool {
        self.executable
    }

    /// Unix mode bits (`0o755` / `0o644`).
    pub const fn unix_mode(&self) -> u32 {
        let mut mode = 0;
        if self.readable {
            mode |= 0o444;
        }
        if self.writable {
            mode |= 0o200;
        }
        if self.executable {
            mode |= 0o111;
        }
        mode
    }
}

impl Default for Permissions {
    fn default() -> Self {
        Self::read_write()
    }
}
