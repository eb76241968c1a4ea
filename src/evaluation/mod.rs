use sha2::{Digest, Sha256};

use crate::flags::{Flag, RolloutType};

// Bucketing key used when the caller has no stable identity
const ANONYMOUS_USER: &str = "anonymous";

/// Decide whether `flag` is on for `env` and `user_key`.
///
/// Pure and deterministic: the only input to percentage bucketing is the
/// `name|env|user` triple, so a user keeps their bucket across calls and
/// restarts, and buckets are independent per flag and per environment.
pub fn evaluate(flag: &Flag, env: &str, user_key: &str) -> bool {
    // Step 1: master switch
    if !flag.enabled {
        return false;
    }

    // Step 2: environment targeting, empty list means every environment
    if !flag.envs.is_empty() && !flag.envs.iter().any(|e| env_matches(e, env)) {
        return false;
    }

    // Step 3: rollout policy
    match &flag.rollout.rollout_type {
        RolloutType::All | RolloutType::Unspecified => true,
        RolloutType::None => false,
        RolloutType::Percentage => {
            let percentage = flag.rollout.percentage;
            if percentage <= 0 {
                return false;
            }
            if percentage >= 100 {
                return true;
            }

            let user_key = if user_key.is_empty() { ANONYMOUS_USER } else { user_key };

            i64::from(bucket(&flag.name, env, user_key)) < percentage
        }
        // unknown policy never grants access
        RolloutType::Other(_) => false,
    }
}

// Case-insensitive, including non-ASCII environment names
fn env_matches(allowed: &str, env: &str) -> bool {
    allowed.eq_ignore_ascii_case(env) || allowed.to_lowercase() == env.to_lowercase()
}

/// Stable bucket in `0..100` for a flag/env/user triple.
pub fn bucket(flag_name: &str, env: &str, user_key: &str) -> u32 {
    let digest = Sha256::digest(format!("{}|{}|{}", flag_name, env, user_key).as_bytes());
    let n = u32::from_be_bytes([digest[0], digest[1], digest[2], digest[3]]);

    n % 100
}
