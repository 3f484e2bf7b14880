use super::{BenchArgs, DEFAULT_BODY, HttpMethod, PositiveU64, PositiveUsize};
use crate::error::AppResult;

pub(crate) fn positive_u64(value: u64) -> AppResult<PositiveU64> {
    Ok(PositiveU64::try_from(value)?)
}

pub(crate) fn positive_usize(value: usize) -> AppResult<PositiveUsize> {
    Ok(PositiveUsize::try_from(value)?)
}

pub(crate) fn base_args() -> AppResult<BenchArgs> {
    Ok(BenchArgs {
        url: Some("http://localhost".to_owned()),
        connections: positive_usize(1)?,
        pipelining: positive_usize(1)?,
        duration: positive_u64(1)?,
        timeout: positive_u64(1)?,
        method: HttpMethod::Post,
        data: DEFAULT_BODY.to_owned(),
        headers: vec![],
        verify_tls: false,
        debug: false,
        config: None,
        output: None,
        no_color: false,
    })
}
