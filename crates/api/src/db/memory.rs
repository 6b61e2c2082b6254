//! In-process store implementing every repository trait.
//!
//! Mirrors the constraints the `PostgreSQL` schema enforces (unique email,
//! one cart per user, foreign keys, column lengths, cascade deletes) so services and routes
//! can be tested without a database. Every call is counted, and an optional
//! artificial latency lets tests exercise deadlines.

use std::collections::BTreeMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use async_trait::async_trait;
use chrono::Utc;

use bazaar_core::{CartId, CartItemId, CategoryId, Email, ProductId, Quantity, UserId, UserRole};

use super::{
    CartItemRepository, CartRepository, ProductRepository, RepositoryError, UserRepository,
};
use crate::models::{Cart, CartItem, NewCartItem, NewUser, Product, ProductDraft, User};

#[derive(Default)]
struct State {
    users: BTreeMap<UserId, (User, String)>,
    carts: BTreeMap<CartId, Cart>,
    items: BTreeMap<CartItemId, CartItem>,
    products: BTreeMap<ProductId, Product>,
    categories: BTreeMap<CategoryId, String>,
    next_id: i32,
}

impl State {
    const fn next_id(&mut self) -> i32 {
        self.next_id += 1;
        self.next_id
    }

    fn cart_of(&self, user_id: UserId) -> Option<Cart> {
        self.carts.values().find(|c| c.user_id == user_id).copied()
    }

    fn with_cart(&self, user: &User) -> User {
        User {
            cart: self.cart_of(user.id),
            ..user.clone()
        }
    }

    fn insert_cart(&mut self, user_id: UserId) -> Result<Cart, RepositoryError> {
        if !self.users.contains_key(&user_id) {
            return Err(RepositoryError::InvalidReference("carts_user_id_fkey".to_owned()));
        }
        if self.cart_of(user_id).is_some() {
            return Err(RepositoryError::Conflict("user already has a cart".to_owned()));
        }
        let cart = Cart {
            id: CartId::new(self.next_id()),
            user_id,
        };
        self.carts.insert(cart.id, cart);
        Ok(cart)
    }
}

/// Shared in-memory storage; clone the `Arc` into each repository slot.
#[derive(Default)]
pub struct InMemoryStore {
    state: Mutex<State>,
    calls: AtomicUsize,
    latency: Option<Duration>,
}

impl InMemoryStore {
    /// Create an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an empty store whose every call sleeps for `latency` first.
    #[must_use]
    pub fn with_latency(latency: Duration) -> Self {
        Self {
            latency: Some(latency),
            ..Self::default()
        }
    }

    /// Seed a category, returning its ID.
    pub fn add_category(&self, name: &str) -> CategoryId {
        let mut state = self.lock();
        let id = CategoryId::new(state.next_id());
        state.categories.insert(id, name.to_owned());
        id
    }

    /// Number of repository calls made so far.
    #[must_use]
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    async fn enter(&self) {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if let Some(latency) = self.latency {
            tokio::time::sleep(latency).await;
        }
    }

    fn lock(&self) -> MutexGuard<'_, State> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

#[async_trait]
impl UserRepository for InMemoryStore {
    async fn insert(&self, user: NewUser) -> Result<User, RepositoryError> {
        self.enter().await;
        user.check_lengths().map_err(RepositoryError::InvalidValue)?;
        let mut state = self.lock();

        if state.users.values().any(|(u, _)| u.email == user.email) {
            return Err(RepositoryError::Conflict("email already registered".to_owned()));
        }

        let created = User {
            id: UserId::new(state.next_id()),
            username: user.username,
            email: user.email,
            role: user.role,
            cart: None,
            created_at: Utc::now(),
        };
        state
            .users
            .insert(created.id, (created.clone(), user.password_hash));

        let cart = if created.role == UserRole::Customer {
            Some(state.insert_cart(created.id)?)
        } else {
            None
        };

        Ok(User { cart, ..created })
    }

    async fn find_by_id(&self, id: UserId) -> Result<Option<User>, RepositoryError> {
        self.enter().await;
        let state = self.lock();
        Ok(state.users.get(&id).map(|(u, _)| state.with_cart(u)))
    }

    async fn find_by_email(
        &self,
        email: &Email,
    ) -> Result<Option<(User, String)>, RepositoryError> {
        self.enter().await;
        let state = self.lock();
        Ok(state
            .users
            .values()
            .find(|(u, _)| &u.email == email)
            .map(|(u, hash)| (state.with_cart(u), hash.clone())))
    }
}

#[async_trait]
impl CartRepository for InMemoryStore {
    async fn create(&self, user_id: UserId) -> Result<Cart, RepositoryError> {
        self.enter().await;
        self.lock().insert_cart(user_id)
    }

    async fn get(&self, user_id: UserId) -> Result<Option<Cart>, RepositoryError> {
        self.enter().await;
        Ok(self.lock().cart_of(user_id))
    }
}

#[async_trait]
impl CartItemRepository for InMemoryStore {
    async fn create(&self, item: NewCartItem) -> Result<CartItem, RepositoryError> {
        self.enter().await;
        let mut state = self.lock();

        if !state.carts.contains_key(&item.cart_id) {
            return Err(RepositoryError::InvalidReference("cart_items_cart_id_fkey".to_owned()));
        }
        if !state.products.contains_key(&item.product_id) {
            return Err(RepositoryError::InvalidReference(
                "cart_items_product_id_fkey".to_owned(),
            ));
        }

        let created = CartItem {
            id: CartItemId::new(state.next_id()),
            cart_id: item.cart_id,
            product_id: item.product_id,
            quantity: item.quantity,
            created_at: Utc::now(),
        };
        state.items.insert(created.id, created.clone());
        Ok(created)
    }

    async fn get_item(&self, id: CartItemId) -> Result<Option<CartItem>, RepositoryError> {
        self.enter().await;
        Ok(self.lock().items.get(&id).cloned())
    }

    async fn get_all_by_cart_id(&self, cart_id: CartId) -> Result<Vec<CartItem>, RepositoryError> {
        self.enter().await;
        Ok(self
            .lock()
            .items
            .values()
            .filter(|i| i.cart_id == cart_id)
            .cloned()
            .collect())
    }

    async fn update_quantity(
        &self,
        id: CartItemId,
        quantity: Quantity,
    ) -> Result<(), RepositoryError> {
        self.enter().await;
        let mut state = self.lock();
        let item = state.items.get_mut(&id).ok_or(RepositoryError::NotFound)?;
        item.quantity = quantity;
        Ok(())
    }

    async fn delete_item(&self, id: CartItemId) -> Result<(), RepositoryError> {
        self.enter().await;
        self.lock()
            .items
            .remove(&id)
            .map(|_| ())
            .ok_or(RepositoryError::NotFound)
    }

    async fn delete_all(&self, cart_id: CartId) -> Result<u64, RepositoryError> {
        self.enter().await;
        let mut state = self.lock();
        let before = state.items.len();
        state.items.retain(|_, i| i.cart_id != cart_id);
        Ok(u64::try_from(before - state.items.len()).unwrap_or(u64::MAX))
    }
}

#[async_trait]
impl ProductRepository for InMemoryStore {
    async fn create(
        &self,
        seller_id: UserId,
        draft: &ProductDraft,
    ) -> Result<Product, RepositoryError> {
        self.enter().await;
        draft.check_lengths().map_err(RepositoryError::InvalidValue)?;
        let mut state = self.lock();

        if !state.categories.contains_key(&draft.category_id) {
            return Err(RepositoryError::InvalidReference(
                "products_category_id_fkey".to_owned(),
            ));
        }
        if !state.users.contains_key(&seller_id) {
            return Err(RepositoryError::InvalidReference("products_user_id_fkey".to_owned()));
        }

        let product = Product {
            id: ProductId::new(state.next_id()),
            name: draft.name.clone(),
            description: draft.description.clone(),
            price: draft.price,
            image_url: draft.image_url.clone(),
            category_id: draft.category_id,
            seller_id,
            created_at: Utc::now(),
        };
        state.products.insert(product.id, product.clone());
        Ok(product)
    }

    async fn get_by_id(&self, id: ProductId) -> Result<Option<Product>, RepositoryError> {
        self.enter().await;
        Ok(self.lock().products.get(&id).cloned())
    }

    async fn get_all(&self) -> Result<Vec<Product>, RepositoryError> {
        self.enter().await;
        Ok(self.lock().products.values().cloned().collect())
    }

    async fn get_all_by_seller(&self, seller_id: UserId) -> Result<Vec<Product>, RepositoryError> {
        self.enter().await;
        Ok(self
            .lock()
            .products
            .values()
            .filter(|p| p.seller_id == seller_id)
            .cloned()
            .collect())
    }

    async fn update(
        &self,
        id: ProductId,
        draft: &ProductDraft,
    ) -> Result<Product, RepositoryError> {
        self.enter().await;
        draft.check_lengths().map_err(RepositoryError::InvalidValue)?;
        let mut state = self.lock();

        if !state.categories.contains_key(&draft.category_id) {
            return Err(RepositoryError::InvalidReference(
                "products_category_id_fkey".to_owned(),
            ));
        }

        let product = state.products.get_mut(&id).ok_or(RepositoryError::NotFound)?;
        product.name.clone_from(&draft.name);
        product.description.clone_from(&draft.description);
        product.price = draft.price;
        product.image_url.clone_from(&draft.image_url);
        product.category_id = draft.category_id;
        Ok(product.clone())
    }

    async fn delete(&self, id: ProductId) -> Result<(), RepositoryError> {
        self.enter().await;
        let mut state = self.lock();
        state.products.remove(&id).ok_or(RepositoryError::NotFound)?;
        state.items.retain(|_, i| i.product_id != id);
        Ok(())
    }
}
