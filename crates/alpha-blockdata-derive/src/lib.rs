//! Procedural macros for consensus encoding and decoding.

use proc_macro::TokenStream;
use quote::quote;
use syn::{parse_macro_input, Data, DeriveInput, Fields};

/// Derives `Encodable` and `Decodable` for a struct by encoding/decoding
/// every field in declaration order, with no length prefix or tag.
///
/// The expansion refers to `crate::consensus` and `crate::io`, so the macro
/// is meant to be used inside `alpha-blockdata` itself.
///
/// # Example
///
/// ```ignore
/// use alpha_blockdata_derive::ConsensusCodec;
///
/// #[derive(ConsensusCodec)]
/// struct PowPreimage {
///     version: i32,
///     prev_blockhash: BlockHash,
///     merkle_root: TxMerkleNode,
///     height: u32,
///     reserved: Reserved,
///     time: u32,
///     bits: CompactTarget,
/// }
/// ```
#[proc_macro_derive(ConsensusCodec)]
pub fn derive_consensus_codec(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);

    let name = &input.ident;
    let generics = &input.generics;
    let (impl_generics, ty_generics, where_clause) = generics.split_for_impl();

    let fields = match &input.data {
        Data::Struct(data) => match &data.fields {
            Fields::Named(fields) => &fields.named,
            Fields::Unnamed(fields) => &fields.unnamed,
            Fields::Unit => {
                return syn::Error::new_spanned(
                    &input,
                    "ConsensusCodec cannot be derived for unit structs",
                )
                .to_compile_error()
                .into();
            }
        },
        Data::Enum(_) => {
            return syn::Error::new_spanned(&input, "ConsensusCodec cannot be derived for enums")
                .to_compile_error()
                .into();
        }
        Data::Union(_) => {
            return syn::Error::new_spanned(&input, "ConsensusCodec cannot be derived for unions")
                .to_compile_error()
                .into();
        }
    };

    let named = fields.iter().any(|f| f.ident.is_some());

    let field_accesses: Vec<_> = fields
        .iter()
        .enumerate()
        .map(|(i, field)| match &field.ident {
            Some(ident) => quote! { self.#ident },
            None => {
                let index = syn::Index::from(i);
                quote! { self.#index }
            }
        })
        .collect();

    let decode_finite: Vec<_> = fields
        .iter()
        .map(|field| {
            let value = quote! {
                crate::consensus::Decodable::consensus_decode_from_finite_reader(reader)?
            };
            match &field.ident {
                Some(ident) => quote! { #ident: #value },
                None => value,
            }
        })
        .collect();

    let decode_limited: Vec<_> = fields
        .iter()
        .map(|field| {
            let value = quote! {
                crate::consensus::Decodable::consensus_decode_from_finite_reader(&mut limited_reader)?
            };
            match &field.ident {
                Some(ident) => quote! { #ident: #value },
                None => value,
            }
        })
        .collect();

    let constructor = if named {
        quote! { #name { #(#decode_finite),* } }
    } else {
        quote! { #name(#(#decode_finite),*) }
    };

    let constructor_limited = if named {
        quote! { #name { #(#decode_limited),* } }
    } else {
        quote! { #name(#(#decode_limited),*) }
    };

    let expanded = quote! {
        impl #impl_generics crate::consensus::Encodable for #name #ty_generics #where_clause {
            #[inline]
            fn consensus_encode<W: crate::io::Write + ?Sized>(
                &self,
                writer: &mut W,
            ) -> core::result::Result<usize, crate::io::Error> {
                let mut len: usize = 0;
                #(
                    len = len.saturating_add(
                        crate::consensus::Encodable::consensus_encode(&#field_accesses, writer)?,
                    );
                )*
                Ok(len)
            }
        }

        impl #impl_generics crate::consensus::Decodable for #name #ty_generics #where_clause {
            #[inline]
            fn consensus_decode_from_finite_reader<R: crate::io::Read + ?Sized>(
                reader: &mut R,
            ) -> core::result::Result<Self, crate::consensus::EncodeDecodeError> {
                Ok(#constructor)
            }

            #[inline]
            fn consensus_decode<R: crate::io::Read + ?Sized>(
                reader: &mut R,
            ) -> core::result::Result<Self, crate::consensus::EncodeDecodeError> {
                let mut limited_reader =
                    crate::io::Read::take(reader, crate::consensus::MAX_VEC_SIZE as u64);
                Ok(#constructor_limited)
            }
        }
    };

    TokenStream::from(expanded)
}
