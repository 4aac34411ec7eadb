// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::error::AppError;

pub mod categories;
pub mod serve;
pub mod tokens;
pub mod users;

/// Flattens a domain error for terminal output, keeping field messages.
pub(crate) fn cli_error(e: AppError) -> anyhow::Error {
    if e.is_internal() {
        return anyhow::Error::new(e);
    }
    anyhow::anyhow!(e.messages().join("; "))
}
