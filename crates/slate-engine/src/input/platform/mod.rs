pub(crate) mod winit;
