// Controller input as the dialog sees it.

/// Current button bitmask (`CTRL_*` bits), sampled once per tick.
pub trait ButtonSource {
    fn peek_buttons(&self) -> u32;
}

/// A fixed mask, for front ends without a controller.
impl ButtonSource for u32 {
    fn peek_buttons(&self) -> u32 {
        *self
    }
}
