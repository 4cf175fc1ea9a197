use quote::quote;
use syn::{
    parse::{Parse, ParseStream},
    DeriveInput, Generics, Ident, Token,
};

use crate::{Expand, Expanded};

/// UID attributes
///
/// #[uid(data = <type>)]
#[derive(Clone)]
pub struct Attributes {
    pub ident: Ident,
    generics: Generics,
}

impl Default for Attributes {
    fn default() -> Self {
        Self {
            ident: Ident::new("Vec", proc_macro2::Span::call_site()),
            generics: syn::parse_quote!(<f64>),
        }
    }
}

impl Parse for Attributes {
    fn parse(input: ParseStream) -> syn::Result<Self> {
        let mut uid_attrs: Attributes = Default::default();
        while let Ok(key) = input.parse::<Ident>() {
            let _ = input.parse::<Token!(=)>()?;
            if key == "data" {
                uid_attrs.ident = input.parse::<Ident>()?;
                uid_attrs.generics = input.parse::<Generics>()?;
            } else {
                return Err(syn::Error::new(
                    key.span(),
                    format!("unknown uid attribute `{key}`, expected `data`"),
                ));
            }
            let Ok(_) = input.parse::<Token!(,)>() else {
                return Ok(uid_attrs);
            };
        }
        Ok(uid_attrs)
    }
}
impl Expand for Attributes {
    fn expand(&self, input: &DeriveInput) -> Expanded {
        let DeriveInput {
            ident, generics, ..
        } = input;
        let (impl_generics, ty_generics, where_clause) = generics.split_for_impl();
        let Self {
            ident: name,
            generics: name_generics,
        } = self;
        let (_name_impl_generics, name_ty_generics, _name_where_clause) =
            name_generics.split_for_impl();
        quote! {
            impl #impl_generics ::interface::UniqueIdentifier for #ident #ty_generics #where_clause {
                type DataType = #name #name_ty_generics;
            }
        }
    }
}
