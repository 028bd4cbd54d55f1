//! Network plumbing: the I/O thread and the channels that connect it to
//! the control loop.

pub mod channels;
pub mod io_task;
