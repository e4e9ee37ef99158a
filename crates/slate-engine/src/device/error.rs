/// High-level response after a surface error.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum SurfaceErrorAction {
    /// Surface was reconfigured; rendering may resume next frame.
    Reconfigured,
    /// Transient error; skip the current frame.
    SkipFrame,
    /// Fatal error (commonly OOM); the backend stops rendering.
    Fatal,
}

impl SurfaceErrorAction {
    /// Maps a wgpu surface error to the action the backend takes.
    ///
    /// `Reconfigured` only says the surface must be configured again; the
    /// caller does the reconfiguration.
    pub fn classify(err: &wgpu::SurfaceError) -> Self {
        match err {
            wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated => Self::Reconfigured,
            wgpu::SurfaceError::OutOfMemory => Self::Fatal,
            wgpu::SurfaceError::Timeout | wgpu::SurfaceError::Other => Self::SkipFrame,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_out_of_memory_is_fatal() {
        use wgpu::SurfaceError as E;
        assert_eq!(SurfaceErrorAction::classify(&E::OutOfMemory), SurfaceErrorAction::Fatal);
        assert_eq!(SurfaceErrorAction::classify(&E::Lost), SurfaceErrorAction::Reconfigured);
        assert_eq!(SurfaceErrorAction::classify(&E::Outdated), SurfaceErrorAction::Reconfigured);
        assert_eq!(SurfaceErrorAction::classify(&E::Timeout), SurfaceErrorAction::SkipFrame);
        assert_eq!(SurfaceErrorAction::classify(&E::Other), SurfaceErrorAction::SkipFrame);
    }
}
