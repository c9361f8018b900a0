use thiserror::Error;

#[derive(Error, Debug)]
pub enum FilterError {
    #[error("Parameter ${0} is not bound")]
    UnboundParameter(usize),
}
