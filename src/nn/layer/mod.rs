/*
 * @Description  : 神经网络层
 */

mod init;
mod linear;

pub use init::Init;
pub use linear::{Linear, LinearGrads};
