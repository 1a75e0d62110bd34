use proc_macro::TokenStream;
use proc_macro2::TokenStream as TokenStream2;
use quote::quote;
use syn::parse::Parser;
use syn::{Generics, Ident, Item};

#[derive(Default)]
struct Capabilities {
    participant: bool,
    disposable: bool,
}

pub fn runtime_service_attribute(attr: TokenStream, item: TokenStream) -> TokenStream {
    expand(attr.into(), item.into()).into()
}

fn expand(attr: TokenStream2, item: TokenStream2) -> TokenStream2 {
    let mut capabilities = Capabilities::default();
    let parser = syn::meta::parser(|meta| {
        if meta.path.is_ident("participant") {
            capabilities.participant = true;
            Ok(())
        } else if meta.path.is_ident("disposable") {
            capabilities.disposable = true;
            Ok(())
        } else {
            Err(meta.error("expected `participant` or `disposable`"))
        }
    });
    if let Err(e) = parser.parse2(attr) {
        return e.into_compile_error();
    }

    let item = match syn::parse2::<Item>(item) {
        Ok(item) => item,
        Err(e) => return e.into_compile_error(),
    };
    let (ident, generics) = match &item {
        Item::Struct(s) => (&s.ident, &s.generics),
        Item::Enum(e) => (&e.ident, &e.generics),
        other => {
            return syn::Error::new_spanned(
                other,
                "#[runtime_service] can only mark struct or enum declarations",
            )
            .into_compile_error();
        }
    };

    generate_runtime_service_impl(ident, generics, &capabilities)
        .map(|expanded| quote!(#item #expanded))
        .unwrap_or_else(syn::Error::into_compile_error)
}

fn generate_runtime_service_impl(
    ident: &Ident,
    generics: &Generics,
    capabilities: &Capabilities,
) -> syn::Result<TokenStream2> {
    if !generics.params.is_empty() {
        return Err(syn::Error::new_spanned(
            generics,
            "#[runtime_service] does not support generic types",
        ));
    }

    let participant = capabilities.participant.then(|| {
        quote! {
            fn as_participant(&self) -> ::std::option::Option<&dyn ::wiring::LifecycleParticipant> {
                ::std::option::Option::Some(self)
            }
        }
    });

    let disposable = capabilities.disposable.then(|| {
        quote! {
            fn as_disposable(&self) -> ::std::option::Option<&dyn ::wiring::Disposable> {
                ::std::option::Option::Some(self)
            }
        }
    });

    Ok(quote! {
        impl ::wiring::RuntimeService for #ident {
            #participant
            #disposable
        }

        const _: () = {
            fn register() -> ::wiring::RuntimeServiceMarker {
                ::wiring::RuntimeServiceMarker::of::<#ident>()
            }

            ::wiring::lifecycle::internal::submit! {
                ::wiring::lifecycle::internal::MarkerRegisterer { register }
            }
        };
    })
}
