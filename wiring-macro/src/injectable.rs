use proc_macro::TokenStream;
use proc_macro2::TokenStream as TokenStream2;
use quote::quote;
use syn::{parse_macro_input, Data, DeriveInput, Expr, Field, Fields, LitStr, Type};

pub fn derive_injectable(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);

    generate_injectable_impl(&input)
        .unwrap_or_else(syn::Error::into_compile_error)
        .into()
}

fn generate_injectable_impl(input: &DeriveInput) -> syn::Result<TokenStream2> {
    let struct_name = &input.ident;

    if !input.generics.params.is_empty() {
        return Err(syn::Error::new_spanned(
            &input.generics,
            "#[derive(Injectable)] does not support generic types",
        ));
    }

    let fields = match &input.data {
        Data::Struct(data) => &data.fields,
        _ => {
            return Err(syn::Error::new_spanned(
                struct_name,
                "#[derive(Injectable)] can only be applied to structs",
            ))
        }
    };

    let scope = parse_scope(input)?;

    let mut tokens = Vec::new();
    let mut values = Vec::new();
    for (index, field) in fields.iter().enumerate() {
        let inner = extract_arc_inner(&field.ty).ok_or_else(|| {
            syn::Error::new_spanned(&field.ty, "injectable fields must be `Arc<T>`")
        })?;

        tokens.push(match inject_token(field)? {
            Some(expr) => quote!((#expr).erase()),
            None => quote!(::wiring::Token::<#inner>::of().erase()),
        });
        values.push(quote!(dependencies.get_at::<#inner>(#index)?));
    }

    let construction = match fields {
        Fields::Named(_) => {
            let names = fields.iter().map(|field| &field.ident);
            quote!(Self { #(#names: #values),* })
        }
        Fields::Unnamed(_) => quote!(Self(#(#values),*)),
        Fields::Unit => quote!(Self),
    };

    Ok(quote! {
        impl ::wiring::Construct for #struct_name {
            fn construct(
                dependencies: &::wiring::Dependencies
            ) -> ::wiring::anyhow::Result<Self> {
                let _ = dependencies;
                Ok(#construction)
            }
        }

        const _: () = {
            fn register() -> ::wiring::di::internal::AnnotatedType {
                ::wiring::di::internal::AnnotatedType::new::<#struct_name>(
                    #scope,
                    ::std::vec![#(#tokens),*],
                )
            }

            ::wiring::di::internal::submit! {
                ::wiring::di::internal::MetadataRegisterer { register }
            }
        };
    })
}

/// Reads `#[injectable(scope = "...")]`, defaulting to singleton.
fn parse_scope(input: &DeriveInput) -> syn::Result<TokenStream2> {
    let mut scope = quote!(::wiring::Scope::Singleton);

    for attr in input.attrs.iter().filter(|a| a.path().is_ident("injectable")) {
        attr.parse_nested_meta(|meta| {
            if !meta.path.is_ident("scope") {
                return Err(meta.error("unsupported injectable option, expected `scope`"));
            }
            let value: LitStr = meta.value()?.parse()?;
            scope = match value.value().as_str() {
                "singleton" => quote!(::wiring::Scope::Singleton),
                "transient" => quote!(::wiring::Scope::Transient),
                _ => {
                    return Err(syn::Error::new_spanned(
                        &value,
                        "scope must be \"singleton\" or \"transient\"",
                    ))
                }
            };
            Ok(())
        })?;
    }

    Ok(scope)
}

fn inject_token(field: &Field) -> syn::Result<Option<Expr>> {
    field
        .attrs
        .iter()
        .find(|a| a.path().is_ident("inject"))
        .map(|attr| attr.parse_args::<Expr>())
        .transpose()
}

/// Extract the inner type from Arc<T> or Arc<dyn Trait>
fn extract_arc_inner(ty: &Type) -> Option<&Type> {
    let Type::Path(type_path) = ty else {
        return None;
    };
    let segment = type_path.path.segments.last()?;
    if segment.ident != "Arc" {
        return None;
    }
    match &segment.arguments {
        syn::PathArguments::AngleBracketed(args) => match args.args.first()? {
            syn::GenericArgument::Type(inner) => Some(inner),
            _ => None,
        },
        _ => None,
    }
}
