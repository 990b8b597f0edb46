use proc_macro::TokenStream;
use proc_macro2::TokenTree;
use quote::{ToTokens, quote};
use syn::ext::IdentExt;
use syn::{Attribute, Data, DeriveInput, Expr, Fields, Lit, Token, UnOp, parse_macro_input};

/// Helper enum for parsed attribute values
enum MetaValue {
    Literal(String),
    Flag,
}

/// Derive `EnvConfig` (and `Field`, so the struct can be nested) for a struct
/// with named fields.
///
/// Every field is visited in declaration order. Annotate leaves with
/// `#[field(env = "KEY", ...)]`; fields of nested config structs need no
/// annotation. `#[field(skip)]` leaves a field out entirely.
#[proc_macro_derive(EnvConfig, attributes(field))]
pub fn derive_env_config(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);

    match generate_env_config(&input) {
        Ok(tokens) => tokens.into(),
        Err(err) => err.to_compile_error().into(),
    }
}

fn generate_env_config(input: &DeriveInput) -> syn::Result<proc_macro2::TokenStream> {
    let struct_name = &input.ident;

    let fields: Vec<&syn::Field> = match &input.data {
        Data::Struct(data) => match &data.fields {
            Fields::Named(fields) => fields.named.iter().collect(),
            Fields::Unit => Vec::new(),
            Fields::Unnamed(_) => {
                return Err(syn::Error::new_spanned(
                    input,
                    "EnvConfig only supports structs with named fields",
                ));
            }
        },
        _ => {
            return Err(syn::Error::new_spanned(
                input,
                "EnvConfig only supports structs",
            ));
        }
    };

    let mut visits = Vec::new();
    let mut bounded = Vec::new();
    let type_params: Vec<&syn::Ident> = input
        .generics
        .type_params()
        .map(|param| &param.ident)
        .collect();

    for field in fields {
        let Some(field_ident) = field.ident.as_ref() else {
            continue;
        };

        let config = parse_field_config(&field.attrs)?;
        if config.skip {
            continue;
        }

        if mentions_type_param(field.ty.to_token_stream(), &type_params) {
            bounded.push(&field.ty);
        }

        let field_name = field_ident.unraw().to_string();
        let tag_names = config.tags.iter().map(|(name, _)| name);
        let tag_values = config.tags.iter().map(|(_, value)| value);

        visits.push(quote! {
            {
                const SPEC: ::env_binder::FieldSpec = ::env_binder::FieldSpec::new(
                    #field_name,
                    &[#((#tag_names, #tag_values)),*],
                );
                loader.visit(&mut self.#field_ident, &SPEC)?;
            }
        });
    }

    let mut generics = input.generics.clone();
    let predicates = &mut generics.make_where_clause().predicates;
    for ty in bounded {
        predicates.push(syn::parse_quote!(#ty: ::env_binder::Field));
    }
    let (impl_generics, ty_generics, where_clause) = generics.split_for_impl();

    Ok(quote! {
        impl #impl_generics ::env_binder::EnvConfig for #struct_name #ty_generics #where_clause {
            fn load_fields(
                &mut self,
                loader: &::env_binder::Loader,
            ) -> ::core::result::Result<(), ::env_binder::ConfigError> {
                #(#visits)*
                ::core::result::Result::Ok(())
            }
        }

        impl #impl_generics ::env_binder::Field for #struct_name #ty_generics #where_clause {
            fn load(
                &mut self,
                loader: &::env_binder::Loader,
                _spec: &::env_binder::FieldSpec,
            ) -> ::core::result::Result<(), ::env_binder::ConfigError> {
                ::env_binder::EnvConfig::load_fields(self, loader)
            }
        }
    })
}

/// Whether a field type refers to one of the struct's type parameters
fn mentions_type_param(tokens: proc_macro2::TokenStream, params: &[&syn::Ident]) -> bool {
    tokens.into_iter().any(|token| match token {
        TokenTree::Ident(ident) => params.iter().any(|param| **param == ident),
        TokenTree::Group(group) => mentions_type_param(group.stream(), params),
        _ => false,
    })
}

#[derive(Debug, Default)]
struct FieldConfig {
    /// Annotations in the order they were written
    tags: Vec<(String, String)>,
    skip: bool,
}

/// Parse every `#[field(env = "X", required, default = 8080)]` on a field
fn parse_field_config(attrs: &[Attribute]) -> syn::Result<FieldConfig> {
    let mut config = FieldConfig::default();

    for attr in attrs.iter().filter(|attr| attr.path().is_ident("field")) {
        attr.parse_nested_meta(|meta| {
            let key = meta
                .path
                .get_ident()
                .ok_or_else(|| meta.error("expected identifier"))?
                .unraw()
                .to_string();

            let value = if meta.input.peek(Token![=]) {
                meta.input.parse::<Token![=]>()?;
                let expr: Expr = meta.input.parse()?;
                MetaValue::Literal(literal_text(&expr)?)
            } else {
                MetaValue::Flag
            };

            if config.tags.iter().any(|(name, _)| *name == key) {
                return Err(meta.error(format!("duplicate `{}` annotation", key)));
            }

            match value {
                MetaValue::Flag if key == "skip" => config.skip = true,
                MetaValue::Flag if key == "required" => {
                    config.tags.push((key, "true".to_string()));
                }
                MetaValue::Literal(text) => config.tags.push((key, text)),
                MetaValue::Flag => {
                    return Err(meta.error(format!(
                        "`{}` needs a value, e.g. {} = \"...\"",
                        key, key
                    )));
                }
            }

            Ok(())
        })?;
    }

    if config.skip && !config.tags.is_empty() {
        return Err(syn::Error::new(
            proc_macro2::Span::call_site(),
            "`skip` cannot be combined with other field annotations",
        ));
    }

    Ok(config)
}

/// Textual form of a literal annotation value: strings as-is, numbers without
/// their type suffix, booleans as `true`/`false`
fn literal_text(expr: &Expr) -> syn::Result<String> {
    match expr {
        Expr::Lit(lit) => match &lit.lit {
            Lit::Str(s) => Ok(s.value()),
            Lit::Int(i) => Ok(i.base10_digits().to_string()),
            Lit::Float(f) => Ok(f.base10_digits().to_string()),
            Lit::Bool(b) => Ok(b.value.to_string()),
            other => Err(syn::Error::new_spanned(
                other,
                "expected a string, number or boolean literal",
            )),
        },
        Expr::Unary(unary) if matches!(unary.op, UnOp::Neg(_)) => {
            match literal_text(&unary.expr)? {
                text if text.starts_with(|c: char| c.is_ascii_digit()) => {
                    Ok(format!("-{}", text))
                }
                _ => Err(syn::Error::new_spanned(
                    expr,
                    "only numeric literals can be negated",
                )),
            }
        }
        Expr::Group(group) => literal_text(&group.expr),
        _ => Err(syn::Error::new_spanned(
            expr,
            "expected a string, number or boolean literal",
        )),
    }
}
