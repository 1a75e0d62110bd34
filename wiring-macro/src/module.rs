use proc_macro::TokenStream;
use proc_macro2::TokenStream as TokenStream2;
use quote::quote;
use syn::{
    parse::Parse, parse::ParseStream, parse_macro_input, Attribute, Expr, ItemStruct, Path, Token,
};

struct ModuleItem<T> {
    attrs: Vec<Attribute>,
    value: T,
}

impl<T: Parse> Parse for ModuleItem<T> {
    fn parse(input: ParseStream) -> syn::Result<Self> {
        let attrs = input.call(Attribute::parse_outer)?;
        let value = input.parse()?;
        Ok(ModuleItem { attrs, value })
    }
}

struct ModuleArgs {
    imports: Vec<ModuleItem<Path>>,
    register: Vec<ModuleItem<Expr>>,
}

impl Parse for ModuleArgs {
    fn parse(input: ParseStream) -> syn::Result<Self> {
        let mut imports = Vec::new();
        let mut register = Vec::new();

        while !input.is_empty() {
            let name: syn::Ident = input.parse()?;
            input.parse::<Token![=]>()?;

            // Parse array: [Item1, Item2, ...]
            let content;
            syn::bracketed!(content in input);

            if name == "imports" {
                let items = content.parse_terminated(ModuleItem::parse, Token![,])?;
                imports = items.into_iter().collect();
            } else if name == "register" {
                let items = content.parse_terminated(ModuleItem::parse, Token![,])?;
                register = items.into_iter().collect();
            } else {
                return Err(syn::Error::new_spanned(
                    name,
                    "unknown module option, expected `imports` or `register`",
                ));
            }

            if input.peek(Token![,]) {
                input.parse::<Token![,]>()?;
            }
        }

        Ok(ModuleArgs { imports, register })
    }
}

pub fn module_attribute(attr: TokenStream, item: TokenStream) -> TokenStream {
    let args = parse_macro_input!(attr as ModuleArgs);
    let input = parse_macro_input!(item as ItemStruct);
    let expanded = generate_module_impl(&args, &input);

    TokenStream::from(expanded)
}

fn generate_module_impl(args: &ModuleArgs, input: &ItemStruct) -> TokenStream2 {
    let module_name = &input.ident;

    let imports = args.imports.iter().map(|item| {
        let path = &item.value;
        let attrs = &item.attrs;
        quote! {
            #(#attrs)*
            let options = options.import(#path::module()?);
        }
    });

    // A bare type path registers the type itself
    let registrations = args.register.iter().map(|item| {
        let attrs = &item.attrs;
        let registration = match &item.value {
            Expr::Path(type_path) if type_path.qself.is_none() => {
                let path = &type_path.path;
                quote!(::wiring::Registration::of::<#path>())
            }
            expr => quote!(::wiring::Registration::from(#expr)),
        };
        quote! {
            #(#attrs)*
            let options = options.register(#registration);
        }
    });

    quote! {
        #input

        impl #module_name {
            /// Build this module from its imports and registrations
            pub fn module() -> ::wiring::Result<::wiring::Module> {
                let options = ::wiring::ModuleOptions::new();
                #(#imports)*
                #(#registrations)*
                ::wiring::module(options)
            }
        }
    }
}
