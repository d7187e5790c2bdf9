pub mod checkout;
pub mod recipes;

pub use checkout::MockCheckout;
pub use recipes::MockRecipeIndex;
