//! GraphPhys emitter: writes a model back out as a document.
//!
//! Output re-parses to an isomorphic tree. Node names are the particles'
//! unique names, the species travels in the `type` parameter.

use tracing::instrument;

use crate::domain::{
    DecayTree, DomainError, DomainResult, ElementRef, ParamValue, Params, ParticleId, ProcessGroup,
    TYPE_PARAM,
};
use crate::parser::quote_if_necessary;

/// Emit `element` of `group` as GraphPhys text.
///
/// A process group yields all its trees followed by its parameters as
/// `name = value;` statements. A decay on its own has no textual form and is
/// rejected with [`DomainError::InvalidType`].
#[instrument(level = "debug", skip(group))]
pub fn emit(group: &ProcessGroup, element: ElementRef) -> DomainResult<String> {
    let mut out = String::new();
    match element {
        ElementRef::ProcessGroup => {
            for &root in group.root_particles() {
                group.tree().check_depth(root)?;
                emit_particle(group.tree(), root, &mut out)?;
            }
            for (name, value) in group.params() {
                out.push_str(&format!("{} = {};\n", quote(name)?, format_value(value)?));
            }
        }
        ElementRef::Particle(id) => {
            group.tree().check_depth(id)?;
            emit_particle(group.tree(), id, &mut out)?
        }
        ElementRef::Decay(_) => {
            return Err(DomainError::InvalidType(
                "a decay cannot be emitted without its parent particle".to_string(),
            ))
        }
    }
    Ok(out)
}

fn emit_particle(tree: &DecayTree, id: ParticleId, out: &mut String) -> DomainResult<()> {
    let particle = tree.particle(id).ok_or_else(|| DomainError::UnknownParticle(format!("{id:?}")))?;

    for &decay in particle.decays() {
        for &product in tree.decay_ref(decay)?.products() {
            emit_particle(tree, product, out)?;
        }
    }

    let name = quote(&tree.unique_name(id)?)?.into_owned();
    let mut params = Params::new();
    params.insert(TYPE_PARAM.to_string(), ParamValue::Text(particle.type_name().to_string()));
    params.extend(particle.params().iter().map(|(k, v)| (k.clone(), v.clone())));
    out.push_str(&format!("{}{};\n", name, format_list(&params, Some(TYPE_PARAM))?));

    for &decay in particle.decays() {
        let decay = tree.decay_ref(decay)?;
        let products = decay
            .products()
            .iter()
            .map(|&p| tree.unique_name(p).and_then(|n| quote(&n).map(|q| q.into_owned())))
            .collect::<DomainResult<Vec<_>>>()?;
        let list = if decay.params().is_empty() {
            String::new()
        } else {
            format_list(decay.params(), None)?
        };
        out.push_str(&format!("{} -> {{ {} }}{};\n", name, products.join(" "), list));
    }
    Ok(())
}

fn quote(name: &str) -> DomainResult<std::borrow::Cow<'_, str>> {
    quote_if_necessary(name).ok_or_else(|| DomainError::InvalidParam {
        name: name.to_string(),
        reason: "contains a double quote or line break and cannot be written".to_string(),
    })
}

/// `[first=..., k=v, flag]`, with `first` (if present) leading.
fn format_list(params: &Params, first: Option<&str>) -> DomainResult<String> {
    let ordered = first
        .and_then(|key| params.get_key_value(key))
        .into_iter()
        .chain(params.iter().filter(|(k, _)| Some(k.as_str()) != first));

    let mut items = Vec::with_capacity(params.len());
    for (key, value) in ordered {
        let key = quote(key)?;
        items.push(match value {
            ParamValue::Bool(true) => key.into_owned(),
            other => format!("{}={}", key, format_value(other)?),
        });
    }
    Ok(format!("[{}]", items.join(", ")))
}

fn format_value(value: &ParamValue) -> DomainResult<String> {
    match value {
        ParamValue::Map(map) => format_list(map, None),
        ParamValue::Text(text) => Ok(quote(text)?.into_owned()),
        other => Ok(quote(&other.to_string())?.into_owned()),
    }
}
