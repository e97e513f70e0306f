use tracing::debug;

use crate::model::{AllowedKeyConfiguration, CsrOrigin, KeyType, Policy, Request};

// Characters with special meaning outside a character class
const REGEX_META: &str = r"\.+*?()|[]{}^$";
// Characters `regex::escape` may put a backslash in front of
const ESCAPABLE: &str = r"\.+*?()|[]{}^$#&-~ ";

/// Fill request fields the caller left empty from the zone policy
///
/// Never rejects and never overwrites a value the caller set.
pub fn apply_policy_defaults(policy: &Policy, request: &mut Request) {
    apply_subject_defaults(policy, request);
    apply_key_defaults(policy, request);
}

pub(crate) fn apply_subject_defaults(policy: &Policy, request: &mut Request) {
    let subject = &mut request.subject;

    if subject.common_name.is_empty() {
        if let Some(cn) = literal_default(&policy.subject_cn_regexes) {
            debug!("Defaulting common name to {:?}", cn);
            subject.common_name = cn;
        }
    }

    let multi = [
        (&policy.subject_o_regexes, &mut subject.organization),
        (&policy.subject_ou_regexes, &mut subject.organizational_unit),
        (&policy.subject_l_regexes, &mut subject.locality),
        (&policy.subject_st_regexes, &mut subject.province),
        (&policy.subject_c_regexes, &mut subject.country),
    ];
    for (patterns, field) in multi {
        if field.is_empty() {
            if let Some(value) = literal_default(patterns) {
                field.push(value);
            }
        }
    }
}

/// Pick the key shape from the first allowed configuration
///
/// When the caller already chose a type, only its missing size or curve is
/// taken from the first configuration of that type.
pub(crate) fn apply_key_defaults(policy: &Policy, request: &mut Request) {
    if supplies_key_material(request) {
        return;
    }
    let conf = match request.key_type {
        None => policy.allowed_key_configurations.first(),
        Some(key_type) => policy
            .allowed_key_configurations
            .iter()
            .find(|conf| conf.key_type == key_type),
    };
    if let Some(conf) = conf {
        apply_key_configuration(conf, request);
    }
}

/// The caller brought its own key or CSR, whose shape is not ours to pick
pub(crate) fn supplies_key_material(request: &Request) -> bool {
    request.csr_origin == CsrOrigin::UserProvided
        && (request.private_key.as_ref().is_some_and(|k| !k.is_empty())
            || request.csr.as_ref().is_some_and(|c| !c.is_empty()))
}

pub(crate) fn apply_key_configuration(conf: &AllowedKeyConfiguration, request: &mut Request) {
    if supplies_key_material(request) {
        return;
    }
    match request.key_type {
        None => {
            debug!("Defaulting key type to {}", conf.key_type);
            request.key_type = Some(conf.key_type);
        }
        Some(key_type) if key_type != conf.key_type => return,
        Some(_) => {}
    }

    match conf.key_type {
        KeyType::Rsa if request.key_length.is_none() => {
            request.key_length = conf.first_size();
        }
        KeyType::Ecdsa if request.key_curve.is_none() => {
            request.key_curve = conf.first_curve();
        }
        _ => {}
    }
}

/// The single value a pattern set admits, if it is a plain literal
///
/// Only a set holding exactly one pattern qualifies. After stripping the
/// anchors the pattern may contain ordinary characters and backslash-escaped
/// metacharacters, nothing else.
pub(crate) fn literal_default(patterns: &Option<Vec<String>>) -> Option<String> {
    let [pattern] = patterns.as_deref()? else {
        return None;
    };
    let body = pattern.strip_prefix('^').unwrap_or(pattern.as_str());
    let body = body.strip_suffix('$').unwrap_or(body);

    let mut literal = String::with_capacity(body.len());
    let mut chars = body.chars();
    while let Some(c) = chars.next() {
        match c {
            '\\' => match chars.next() {
                Some(escaped) if ESCAPABLE.contains(escaped) => {
                    literal.push(escaped)
                }
                _ => return None,
            },
            c if REGEX_META.contains(c) => return None,
            c => literal.push(c),
        }
    }

    (!literal.is_empty()).then_some(literal)
}
